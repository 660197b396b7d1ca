mod chat;
mod cli;
mod config;
mod db;
mod models;
mod session;
mod tracker;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers::{self, Tracker};
use config::AppConfig;
use db::migrations::run_migrations;
use db::repository::UserRepo;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;
    let user = cli
        .user
        .clone()
        .unwrap_or_else(|| config.user.default_id.clone());

    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    // WAL lets the reminder cron job read while a dashboard is open
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    run_migrations(&conn)?;

    match cli.command {
        Some(Commands::Setup { reset, plain }) => {
            handlers::handle_setup(&conn, &mut config, &user, reset, plain)?;
        }

        // Reminders and chat cover many users or run their own onboarding
        Some(Commands::Remind { tahajjud }) => {
            handlers::handle_remind(&conn, &config, tahajjud)?;
        }
        Some(Commands::Chat) => {
            handlers::handle_chat(&conn, &config, &user)?;
        }
        Some(Commands::Wipe { yes }) => {
            handlers::handle_wipe(&conn, &user, yes)?;
        }

        Some(cmd) => {
            if !ensure_setup(&conn, &mut config, &user)? {
                return Ok(());
            }
            let t = Tracker::new(&config, &user)?;
            match cmd {
                Commands::Today => handlers::handle_today(&conn, &t)?,
                Commands::Mosque { prayer } => handlers::handle_mosque(&conn, &t, prayer)?,
                Commands::Toggle { habit } => handlers::handle_toggle(&conn, &t, habit)?,
                Commands::Add { metric, amount } => {
                    handlers::handle_add(&conn, &t, metric, &amount)?
                }
                Commands::Stats => handlers::handle_stats(&conn, &t)?,
                Commands::Goals => handlers::handle_goals(&conn, &t)?,
                Commands::Reset => handlers::handle_reset(&conn, &t)?,
                Commands::Export => handlers::handle_export(&conn, &t)?,
                Commands::Setup { .. }
                | Commands::Remind { .. }
                | Commands::Chat
                | Commands::Wipe { .. } => unreachable!(),
            }
        }

        // No subcommand → launch TUI
        None => {
            if ensure_setup(&conn, &mut config, &user)? {
                tui::app::run(conn, config, &user)?;
            }
        }
    }

    Ok(())
}

/// Runs the goal wizard for users who have not finished it. Returns `false`
/// when the wizard was abandoned.
fn ensure_setup(conn: &Connection, config: &mut AppConfig, user: &str) -> Result<bool> {
    if UserRepo::is_setup_done(conn, user)? {
        return Ok(true);
    }
    eprintln!("No goals set for '{}'. Running setup...", user);
    eprintln!();
    handlers::handle_setup(conn, config, user, false, false)?;
    UserRepo::is_setup_done(conn, user)
}
