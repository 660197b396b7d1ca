use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::io::{self, BufRead, Write};

use crate::chat::Conversation;
use crate::config::AppConfig;
use crate::db::repository::{DayRepo, GoalsRepo, UserRepo};
use crate::models::{CheckKind, Counter, DayMap, Flag, Goals, Prayer, StatisticsReport};
use crate::session::{GoalSetup, SessionStore};
use crate::tracker::{aggregate_statistics_with_window, remaining, DimensionSet};
use crate::utils::clock::Clock;
use crate::utils::format::{format_amount, mark};
use crate::utils::input::parse_amount;
use crate::utils::report;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

/// Everything a command needs besides the connection.
pub struct Tracker<'a> {
    pub config: &'a AppConfig,
    pub clock: Clock,
    pub dims: DimensionSet,
    pub user: &'a str,
}

impl<'a> Tracker<'a> {
    pub fn new(config: &'a AppConfig, user: &'a str) -> Result<Self> {
        Ok(Self {
            config,
            clock: config.tracker.clock()?,
            dims: config.tracker.dimension_set()?,
            user,
        })
    }

    fn goals(&self, conn: &Connection) -> Result<Goals> {
        GoalsRepo::resolve(conn, self.user, &self.config.goals)
    }

    fn today(&self) -> String {
        self.clock.today_key()
    }

    fn statistics(&self, conn: &Connection, goals: &Goals) -> Result<Option<StatisticsReport>> {
        let days = DayRepo::get_all(conn, self.user)?;
        Ok(aggregate_statistics_with_window(
            &days,
            goals,
            &self.dims,
            self.clock.today(),
            self.config.tracker.heatmap_window,
        ))
    }
}

// ─── Setup wizard ────────────────────────────────────────────────────────────

pub fn handle_setup(
    conn: &Connection,
    config: &mut AppConfig,
    user: &str,
    reset: bool,
    plain: bool,
) -> Result<()> {
    if !reset && UserRepo::is_setup_done(conn, user)? {
        println!("Goals are already set. Use --reset to set them again.");
        return Ok(());
    }
    let finished = if plain {
        run_plain_setup(conn, config, user, &mut io::stdin().lock())?
    } else {
        crate::cli::setup_tui::run_setup_tui(conn, config, user)?
    };
    if finished {
        let goals = GoalsRepo::resolve(conn, user, &config.goals)?;
        println!();
        println_colored!(GREEN, "  ✓ Goals saved");
        print_block(&report::goals_summary(&goals));
    } else {
        println_colored!(DIM, "  Setup cancelled, nothing was saved.");
    }
    Ok(())
}

/// Line-by-line setup. Goals are stored only once every question is
/// answered; returns `false` if input ends first.
fn run_plain_setup(
    conn: &Connection,
    config: &AppConfig,
    user: &str,
    input: &mut impl BufRead,
) -> Result<bool> {
    UserRepo::ensure(conn, user)?;
    let mut setup = GoalSetup::new(GoalsRepo::resolve(conn, user, &config.goals)?);

    println!();
    println_colored!(GOLD, "  Daily goals ({} questions)", GoalSetup::TOTAL_STEPS);

    while let Some(question) = setup.prompt() {
        println!();
        print_block(&question);
        let Some(answer) = read_answer(input, "  > ")? else {
            return Ok(false);
        };
        if let Err(e) = setup.submit(&answer) {
            println_colored!(RED, "  ✗ {}", e);
        }
    }

    crate::cli::setup_tui::save_goals(conn, user, &setup.collected())?;
    UserRepo::set_setup_done(conn, user, true)?;
    info!("{} finished goal setup", user);
    Ok(true)
}

// ─── Today ───────────────────────────────────────────────────────────────────

pub fn handle_today(conn: &Connection, t: &Tracker) -> Result<()> {
    let goals = t.goals(conn)?;
    let record = DayRepo::get_or_empty(conn, t.user, &t.today())?;
    let title = report::title(&t.clock, &t.config.tracker.campaign_name);
    println!();
    print_block(&report::today_report(&record, &goals, &t.dims, &title));
    println!();
    Ok(())
}

pub fn handle_mosque(conn: &Connection, t: &Tracker, prayer: Prayer) -> Result<()> {
    let record = DayRepo::toggle_prayer(conn, t.user, &t.today(), prayer, t.clock.now())?;
    let attended = record.attended(prayer);
    println_colored!(
        if attended { GREEN } else { DIM },
        "  {} {} at the mosque ({}/5)",
        mark(attended),
        prayer.display_name(),
        record.mosque_count()
    );
    Ok(())
}

pub fn handle_toggle(conn: &Connection, t: &Tracker, flag: Flag) -> Result<()> {
    if !t.dims.contains(CheckKind::Flag(flag)) {
        println_colored!(
            AMBER,
            "  {} is not part of the {:?} checklist",
            flag.display_name(),
            t.config.tracker.checklist
        );
        return Ok(());
    }
    let record = DayRepo::toggle_flag(conn, t.user, &t.today(), flag, t.clock.now())?;
    let done = record.flag(flag);
    println_colored!(
        if done { GREEN } else { DIM },
        "  {} {} {}",
        flag.icon(),
        flag.display_name(),
        if done { "done" } else { "unmarked" }
    );
    Ok(())
}

pub fn handle_add(conn: &Connection, t: &Tracker, counter: Counter, amount: &str) -> Result<()> {
    let amount = parse_amount(amount).map_err(|e| anyhow!("{}", e))?;
    let record = DayRepo::increment(conn, t.user, &t.today(), counter, amount, t.clock.now())?;
    let goals = t.goals(conn)?;
    let total = record.counter(counter);
    let goal = goals.get(counter);
    println_colored!(
        if total >= goal { GREEN } else { AMBER },
        "  {} +{} · today {} of {}",
        counter.icon(),
        format_amount(counter, amount as u64),
        format_amount(counter, total as u64),
        format_amount(counter, goal as u64)
    );
    Ok(())
}

// ─── Stats & goals ───────────────────────────────────────────────────────────

pub fn handle_stats(conn: &Connection, t: &Tracker) -> Result<()> {
    let goals = t.goals(conn)?;
    println!();
    match t.statistics(conn, &goals)? {
        Some(stats) => print_block(&report::statistics_report(
            &stats,
            &goals,
            t.config.tracker.heatmap_window,
        )),
        None => println_colored!(DIM, "  No data yet. Mark something today and check back."),
    }
    println!();
    Ok(())
}

pub fn handle_goals(conn: &Connection, t: &Tracker) -> Result<()> {
    let goals = t.goals(conn)?;
    println!();
    println_colored!(GOLD, "  Daily goals");
    print_block(&report::goals_summary(&goals));
    println!();
    println_colored!(DIM, "  Change them with `ibadah setup --reset`");
    Ok(())
}

// ─── Reset & wipe ────────────────────────────────────────────────────────────

pub fn handle_reset(conn: &Connection, t: &Tracker) -> Result<()> {
    DayRepo::reset(conn, t.user, &t.today(), t.clock.now())?;
    println_colored!(GREEN, "  ✓ Today's marks cleared");
    Ok(())
}

pub fn handle_wipe(conn: &Connection, user: &str, yes: bool) -> Result<()> {
    if !yes {
        let answer = prompt(&format!(
            "  Delete ALL data for '{}'? This cannot be undone. [y/N] ",
            user
        ))?
        .unwrap_or_default();
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println_colored!(DIM, "  Nothing was deleted.");
            return Ok(());
        }
    }
    let days = UserRepo::wipe(conn, user)?;
    println_colored!(RED, "  ✗ Deleted {} and {} day records", user, days);
    Ok(())
}

// ─── Reminders ───────────────────────────────────────────────────────────────

pub fn handle_remind(conn: &Connection, config: &AppConfig, tahajjud: bool) -> Result<()> {
    for (user, text) in build_reminders(conn, config, &config.tracker.clock()?, tahajjud)? {
        println_colored!(GOLD, "[{}]", user);
        print_block(&text);
        println!();
    }
    Ok(())
}

/// One message per user who finished setup. Read-only.
pub fn build_reminders(
    conn: &Connection,
    config: &AppConfig,
    clock: &Clock,
    tahajjud: bool,
) -> Result<Vec<(String, String)>> {
    let dims = config.tracker.dimension_set()?;
    let today = clock.today_key();
    let mut out = Vec::new();

    for user in UserRepo::list_ready(conn)? {
        let record = DayRepo::get_or_empty(conn, &user, &today)?;
        if tahajjud {
            if !record.tahajjud {
                out.push((
                    user,
                    "🕯 The last third of the night is here. Time for tahajjud.".to_string(),
                ));
            }
            continue;
        }
        let goals = GoalsRepo::resolve(conn, &user, &config.goals)?;
        let left = remaining(&record, &goals, &dims);
        let text = format!(
            "{}\n\n{}",
            report::title(clock, &config.tracker.campaign_name),
            report::remaining_report(&left)
        );
        out.push((user, text));
    }
    info!("Built {} reminders", out.len());
    Ok(out)
}

// ─── Chat ────────────────────────────────────────────────────────────────────

pub fn handle_chat(conn: &Connection, config: &AppConfig, user: &str) -> Result<()> {
    let mut chat = Conversation::new(config, config.tracker.clock()?, SessionStore::new())?;
    println_colored!(DIM, "  Chatting as '{}'. Type /help, or Ctrl-D to leave.", user);
    println!();
    print_block(&chat.handle(conn, user, "/start")?);

    while let Some(line) = prompt("\n> ")? {
        if line.trim().is_empty() {
            continue;
        }
        println!();
        print_block(&chat.handle(conn, user, &line)?);
    }
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct Export {
    pub user: String,
    pub exported_at: DateTime<Utc>,
    pub goals: Goals,
    pub days: DayMap,
    pub statistics: Option<StatisticsReport>,
}

pub fn build_export(conn: &Connection, t: &Tracker) -> Result<Export> {
    let goals = t.goals(conn)?;
    Ok(Export {
        user: t.user.to_string(),
        exported_at: t.clock.now(),
        statistics: t.statistics(conn, &goals)?,
        days: DayRepo::get_all(conn, t.user)?,
        goals,
    })
}

pub fn handle_export(conn: &Connection, t: &Tracker) -> Result<()> {
    let export = build_export(conn, t)?;
    let json = serde_json::to_string_pretty(&export).context("Serializing export")?;
    println!("{}", json);
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn print_block(text: &str) {
    for line in text.lines() {
        println!("  {}", line);
    }
}

/// `None` once stdin is closed.
fn prompt(message: &str) -> Result<Option<String>> {
    read_answer(&mut io::stdin().lock(), message)
}

fn read_answer(input: &mut impl BufRead, message: &str) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut buf = String::new();
    let read = input.read_line(&mut buf)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(
        buf.trim_end_matches('\n').trim_end_matches('\r').to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use chrono::NaiveDate;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn clock() -> Clock {
        Clock::pinned(NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(), None)
    }

    #[test]
    fn plain_setup_saves_nothing_when_input_ends_early() {
        let conn = conn();
        let config = AppConfig::default();
        let mut input = io::Cursor::new("10\nlots\n300\n");
        assert!(!run_plain_setup(&conn, &config, "u1", &mut input).unwrap());
        assert!(GoalsRepo::get(&conn, "u1").unwrap().is_none());
        assert!(!UserRepo::is_setup_done(&conn, "u1").unwrap());
    }

    #[test]
    fn plain_setup_saves_all_goals_at_the_end() {
        let conn = conn();
        let config = AppConfig::default();
        let mut input = io::Cursor::new("10\ndefault\n50\n-3\n20\n5\n");
        assert!(run_plain_setup(&conn, &config, "u1", &mut input).unwrap());
        let goals = GoalsRepo::resolve(&conn, "u1", &config.goals).unwrap();
        assert_eq!(goals.quran_pages, 10);
        assert_eq!(goals.istighfar, 500);
        assert_eq!(goals.dhikr, 50);
        assert_eq!(goals.charity, 20);
        assert_eq!(goals.dua, 5);
        assert!(UserRepo::is_setup_done(&conn, "u1").unwrap());
    }

    #[test]
    fn reminders_skip_users_without_setup() {
        let conn = conn();
        let config = AppConfig::default();
        UserRepo::set_setup_done(&conn, "ready", true).unwrap();
        UserRepo::ensure(&conn, "new").unwrap();
        DayRepo::increment(&conn, "ready", "2026-02-20", Counter::QuranPages, 5, Utc::now())
            .unwrap();

        let out = build_reminders(&conn, &config, &clock(), false).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, "ready");
        assert!(out[0].1.contains("📖 Quran: 15 pages left"));
    }

    #[test]
    fn tahajjud_nudge_only_when_unmarked() {
        let conn = conn();
        let config = AppConfig::default();
        UserRepo::set_setup_done(&conn, "a", true).unwrap();
        UserRepo::set_setup_done(&conn, "b", true).unwrap();
        DayRepo::toggle_flag(&conn, "b", "2026-02-20", Flag::Tahajjud, Utc::now()).unwrap();

        let out = build_reminders(&conn, &config, &clock(), true).unwrap();
        let users: Vec<&str> = out.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(users, vec!["a"]);
    }

    #[test]
    fn export_carries_days_and_statistics() {
        let conn = conn();
        let config = AppConfig::default();
        let mut t = Tracker::new(&config, "local").unwrap();
        t.clock = clock();

        let empty = build_export(&conn, &t).unwrap();
        assert!(empty.days.is_empty());
        assert!(empty.statistics.is_none());

        DayRepo::increment(&conn, "local", "2026-02-20", Counter::Dua, 3, Utc::now()).unwrap();
        let export = build_export(&conn, &t).unwrap();
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["user"], "local");
        assert_eq!(json["days"]["2026-02-20"]["dua"], 3);
        assert_eq!(json["goals"]["quran_pages"], 20);
        assert_eq!(json["statistics"]["total_days"], 1);
    }
}
