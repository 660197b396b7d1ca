use clap::{Parser, Subcommand};

use crate::models::{Counter, Flag, Prayer};

#[derive(Parser, Debug)]
#[command(
    name = "ibadah",
    version,
    author,
    about = "A daily worship tracker for Ramadan: goals, streaks and a heatmap"
)]
pub struct Cli {
    /// User id to track (defaults to [user].default_id in config.toml)
    #[arg(long, short, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Goal setup wizard (daily goals, checklist, timezone)
    Setup {
        /// Run again even if setup is already done
        #[arg(long)]
        reset: bool,
        /// Ask on stdin instead of opening the full-screen wizard
        #[arg(long)]
        plain: bool,
    },
    /// Show today's checklist and score
    Today,
    /// Toggle mosque attendance for a prayer
    Mosque {
        /// Prayer name (fajr, dhuhr, asr, maghrib, isha)
        prayer: Prayer,
    },
    /// Toggle a habit for today
    Toggle {
        /// Habit (taraweeh, tahajjud, morning, evening, duha)
        habit: Flag,
    },
    /// Add to one of today's counters
    Add {
        /// Metric (quran, istighfar, dhikr, charity, dua)
        metric: Counter,
        /// Amount to add; a decimal comma is accepted
        amount: String,
    },
    /// Show statistics over the whole history
    Stats,
    /// Show the current daily goals
    Goals,
    /// Clear today's marks and counts
    Reset,
    /// Delete every record for the user
    Wipe {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Print reminders for every user who finished setup (for cron)
    Remind {
        /// Only nudge users who have not marked tahajjud today
        #[arg(long)]
        tahajjud: bool,
    },
    /// Interactive chat session on stdin
    Chat,
    /// Print goals, day records and statistics as JSON
    Export,
}
