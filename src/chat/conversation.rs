use anyhow::Result;
use log::{debug, info};
use rusqlite::Connection;

use crate::chat::command::{self, ChatCommand, HELP};
use crate::config::AppConfig;
use crate::db::repository::{DayRepo, GoalsRepo, UserRepo};
use crate::models::{CheckKind, Counter, DayRecord, Flag, Goals, Prayer};
use crate::session::{GoalSetup, Session, SessionStore};
use crate::tracker::{aggregate_statistics_with_window, remaining, DimensionSet};
use crate::utils::clock::Clock;
use crate::utils::format::{format_amount, mark};
use crate::utils::input::parse_amount;
use crate::utils::report;

/// Text-in, text-out dispatcher for the chat transport. Holds no state of its
/// own beyond the injected session store; everything else lives in SQLite.
pub struct Conversation {
    clock: Clock,
    dims: DimensionSet,
    default_goals: Goals,
    campaign_name: String,
    heatmap_window: usize,
    sessions: SessionStore,
}

impl Conversation {
    pub fn new(config: &AppConfig, clock: Clock, sessions: SessionStore) -> Result<Self> {
        Ok(Self {
            clock,
            dims: config.tracker.dimension_set()?,
            default_goals: config.goals,
            campaign_name: config.tracker.campaign_name.clone(),
            heatmap_window: config.tracker.heatmap_window,
            sessions,
        })
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn handle(&mut self, conn: &Connection, user: &str, text: &str) -> Result<String> {
        match command::parse(text) {
            Some(Ok(cmd)) => self.run_command(conn, user, cmd),
            Some(Err(e)) => Ok(e.to_string()),
            None => self.continue_session(conn, user, text),
        }
    }

    fn run_command(&mut self, conn: &Connection, user: &str, cmd: ChatCommand) -> Result<String> {
        debug!("{}: {:?}", user, cmd);

        // A pending question is abandoned by any other command, except an
        // unfinished setup which must run to completion or /cancel.
        if !matches!(self.sessions.get(user), Some(Session::Setup(_)) | None) {
            self.sessions.clear(user);
        }

        match cmd {
            ChatCommand::Start => return self.start(conn, user),
            ChatCommand::Goals => return self.restart_setup(conn, user),
            ChatCommand::Help => return Ok(HELP.to_string()),
            ChatCommand::Cancel => {
                return Ok(if self.sessions.clear(user) {
                    "Cancelled.".to_string()
                } else {
                    "Nothing to cancel.".to_string()
                });
            }
            ChatCommand::Wipe => {
                self.sessions.begin(user, Session::ConfirmWipe);
                return Ok(
                    "Delete all your data? This cannot be undone. Reply yes or no.".to_string(),
                );
            }
            _ => {}
        }

        if let Some(reply) = self.require_setup(conn, user)? {
            return Ok(reply);
        }

        let today = self.clock.today_key();
        let now = self.clock.now();
        match cmd {
            ChatCommand::Today => self.today(conn, user),
            ChatCommand::Remaining => {
                let goals = self.goals(conn, user)?;
                let record = DayRepo::get_or_empty(conn, user, &today)?;
                Ok(report::remaining_report(&remaining(&record, &goals, &self.dims)))
            }
            ChatCommand::Stats => self.stats(conn, user),
            ChatCommand::ResetToday => {
                DayRepo::reset(conn, user, &today, now)?;
                self.with_today("🧹 Today's marks cleared.".to_string(), conn, user)
            }
            ChatCommand::Mosque(prayer) => {
                let record = DayRepo::toggle_prayer(conn, user, &today, prayer, now)?;
                self.with_today(mosque_line(&record, prayer), conn, user)
            }
            ChatCommand::Toggle(flag) => {
                if !self.dims.contains(CheckKind::Flag(flag)) {
                    return Ok(format!(
                        "{} is not part of your checklist.",
                        flag.display_name()
                    ));
                }
                let record = DayRepo::toggle_flag(conn, user, &today, flag, now)?;
                self.with_today(flag_line(&record, flag), conn, user)
            }
            ChatCommand::Add(counter, Some(amount)) => self.add(conn, user, counter, amount),
            ChatCommand::Add(counter, None) => {
                self.sessions.begin(user, Session::AwaitingAmount(counter));
                Ok(amount_question(counter))
            }
            ChatCommand::Start
            | ChatCommand::Goals
            | ChatCommand::Help
            | ChatCommand::Cancel
            | ChatCommand::Wipe => Ok(HELP.to_string()),
        }
    }

    /// Plain text goes to whatever the user is in the middle of.
    fn continue_session(&mut self, conn: &Connection, user: &str, text: &str) -> Result<String> {
        let Some(session) = self.sessions.take(user) else {
            return Ok(if UserRepo::is_setup_done(conn, user)? {
                "Use /help to see what I can do.".to_string()
            } else {
                "Send /start to set your goals.".to_string()
            });
        };

        match session {
            Session::Setup(mut setup) => match setup.submit(text) {
                Err(e) => {
                    let prompt = setup.prompt().unwrap_or_default();
                    self.sessions.begin(user, Session::Setup(setup));
                    Ok(format!("{}\n\n{}", e, prompt))
                }
                Ok(None) => self.finish_setup(conn, user),
                Ok(Some(answer)) => {
                    GoalsRepo::set(conn, user, answer.counter, answer.value)?;
                    if answer.finished {
                        return self.finish_setup(conn, user);
                    }
                    let prompt = setup.prompt().unwrap_or_default();
                    self.sessions.begin(user, Session::Setup(setup));
                    Ok(prompt)
                }
            },
            Session::AwaitingAmount(counter) => match parse_amount(text) {
                Err(e) => {
                    self.sessions.begin(user, Session::AwaitingAmount(counter));
                    Ok(format!("{}\n\n{}", e, amount_question(counter)))
                }
                Ok(amount) => self.add(conn, user, counter, amount),
            },
            Session::ConfirmWipe => {
                let answer = text.trim().to_lowercase();
                if matches!(answer.as_str(), "yes" | "y") {
                    let days = UserRepo::wipe(conn, user)?;
                    info!("{} wiped their data ({} days)", user, days);
                    Ok("🗑 All your data has been deleted. Send /start to begin again.".to_string())
                } else {
                    Ok("Nothing was deleted.".to_string())
                }
            }
        }
    }

    fn start(&mut self, conn: &Connection, user: &str) -> Result<String> {
        UserRepo::ensure(conn, user)?;
        DayRepo::ensure(conn, user, &self.clock.today_key(), self.clock.now())?;
        if UserRepo::is_setup_done(conn, user)? {
            return self.with_today("Welcome back! 🤲".to_string(), conn, user);
        }
        if let Some(Session::Setup(setup)) = self.sessions.get(user) {
            return Ok(setup.prompt().unwrap_or_default());
        }
        let setup = GoalSetup::new(self.goals(conn, user)?);
        let prompt = setup.prompt().unwrap_or_default();
        self.sessions.begin(user, Session::Setup(setup));
        Ok(format!(
            "Assalamu alaikum! Let's set your daily goals ({} questions).\n\n{}",
            GoalSetup::TOTAL_STEPS,
            prompt
        ))
    }

    fn restart_setup(&mut self, conn: &Connection, user: &str) -> Result<String> {
        UserRepo::set_setup_done(conn, user, false)?;
        let setup = GoalSetup::new(self.goals(conn, user)?);
        let prompt = setup.prompt().unwrap_or_default();
        self.sessions.begin(user, Session::Setup(setup));
        Ok(format!("Let's go over your goals again.\n\n{}", prompt))
    }

    fn finish_setup(&mut self, conn: &Connection, user: &str) -> Result<String> {
        UserRepo::set_setup_done(conn, user, true)?;
        let goals = self.goals(conn, user)?;
        info!("{} finished goal setup", user);
        Ok(format!(
            "✅ Goals saved.\n\n{}\n\nSend /today to see your checklist.",
            report::goals_summary(&goals)
        ))
    }

    /// Starts setup for users who have not finished it and returns the
    /// prompt to show instead of running the command.
    fn require_setup(&mut self, conn: &Connection, user: &str) -> Result<Option<String>> {
        if UserRepo::is_setup_done(conn, user)? {
            return Ok(None);
        }
        if let Some(Session::Setup(setup)) = self.sessions.get(user) {
            return Ok(Some(format!(
                "Let's finish your goals first.\n\n{}",
                setup.prompt().unwrap_or_default()
            )));
        }
        self.start(conn, user).map(Some)
    }

    fn add(&mut self, conn: &Connection, user: &str, counter: Counter, amount: u32) -> Result<String> {
        let record = DayRepo::increment(
            conn,
            user,
            &self.clock.today_key(),
            counter,
            amount,
            self.clock.now(),
        )?;
        let line = format!(
            "{} +{} → {} today",
            counter.icon(),
            format_amount(counter, amount as u64),
            format_amount(counter, record.counter(counter) as u64)
        );
        self.with_today(line, conn, user)
    }

    fn today(&self, conn: &Connection, user: &str) -> Result<String> {
        let goals = self.goals(conn, user)?;
        let record = DayRepo::get_or_empty(conn, user, &self.clock.today_key())?;
        let title = report::title(&self.clock, &self.campaign_name);
        Ok(report::today_report(&record, &goals, &self.dims, &title))
    }

    fn with_today(&self, line: String, conn: &Connection, user: &str) -> Result<String> {
        Ok(format!("{}\n\n{}", line, self.today(conn, user)?))
    }

    fn stats(&self, conn: &Connection, user: &str) -> Result<String> {
        let goals = self.goals(conn, user)?;
        let days = DayRepo::get_all(conn, user)?;
        match aggregate_statistics_with_window(
            &days,
            &goals,
            &self.dims,
            self.clock.today(),
            self.heatmap_window,
        ) {
            Some(stats) => Ok(report::statistics_report(&stats, &goals, self.heatmap_window)),
            None => Ok("No data yet. Mark something today and check back.".to_string()),
        }
    }

    fn goals(&self, conn: &Connection, user: &str) -> Result<Goals> {
        GoalsRepo::resolve(conn, user, &self.default_goals)
    }
}

fn amount_question(counter: Counter) -> String {
    format!(
        "{} How much {} to add? Type a number.",
        counter.icon(),
        counter.display_name()
    )
}

fn mosque_line(record: &DayRecord, prayer: Prayer) -> String {
    format!(
        "🕌 {} at the mosque: {} ({}/5)",
        prayer.display_name(),
        mark(record.attended(prayer)),
        record.mosque_count()
    )
}

fn flag_line(record: &DayRecord, flag: Flag) -> String {
    format!("{} {}: {}", flag.icon(), flag.display_name(), mark(record.flag(flag)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use chrono::NaiveDate;

    fn setup() -> (Connection, Conversation) {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let clock = Clock::pinned(
            NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 18),
        );
        let chat = Conversation::new(&AppConfig::default(), clock, SessionStore::new()).unwrap();
        (conn, chat)
    }

    fn onboard(conn: &Connection, chat: &mut Conversation, user: &str) {
        chat.handle(conn, user, "/start").unwrap();
        for _ in 0..GoalSetup::TOTAL_STEPS {
            chat.handle(conn, user, "default").unwrap();
        }
    }

    #[test]
    fn start_runs_the_goal_setup() {
        let (conn, mut chat) = setup();
        let reply = chat.handle(&conn, "u1", "/start").unwrap();
        assert!(reply.contains("Quran"));

        let reply = chat.handle(&conn, "u1", "ten").unwrap();
        assert!(reply.contains("'ten' is not a number"));

        chat.handle(&conn, "u1", "10").unwrap();
        for _ in 1..GoalSetup::TOTAL_STEPS - 1 {
            chat.handle(&conn, "u1", "default").unwrap();
        }
        let reply = chat.handle(&conn, "u1", "5").unwrap();
        assert!(reply.contains("Goals saved"));
        assert!(UserRepo::is_setup_done(&conn, "u1").unwrap());
        assert!(chat.sessions().is_empty());

        let goals = GoalsRepo::resolve(&conn, "u1", &Goals::default()).unwrap();
        assert_eq!(goals.quran_pages, 10);
        assert_eq!(goals.dua, 5);
    }

    #[test]
    fn tracking_before_setup_starts_setup() {
        let (conn, mut chat) = setup();
        let reply = chat.handle(&conn, "u1", "/today").unwrap();
        assert!(reply.contains("set your daily goals"));
        let reply = chat.handle(&conn, "u1", "/mosque fajr").unwrap();
        assert!(reply.contains("finish your goals first"));
    }

    #[test]
    fn add_and_toggle_update_today() {
        let (conn, mut chat) = setup();
        onboard(&conn, &mut chat, "u1");

        let reply = chat.handle(&conn, "u1", "/add quran 12").unwrap();
        assert!(reply.contains("+12 pages → 12 pages today"));
        assert!(reply.contains("Ramadan — day 3"));

        let reply = chat.handle(&conn, "u1", "/mosque isha").unwrap();
        assert!(reply.contains("Isha at the mosque: ✅ (1/5)"));

        let reply = chat.handle(&conn, "u1", "/toggle taraweeh").unwrap();
        assert!(reply.starts_with("🌙 Taraweeh: ✅"));

        let record = DayRepo::get(&conn, "u1", "2026-02-20").unwrap().unwrap();
        assert_eq!(record.quran_pages, 12);
        assert!(record.taraweeh);
    }

    #[test]
    fn add_without_amount_asks_for_one() {
        let (conn, mut chat) = setup();
        onboard(&conn, &mut chat, "u1");

        let reply = chat.handle(&conn, "u1", "/add dhikr").unwrap();
        assert!(reply.contains("How much"));
        let reply = chat.handle(&conn, "u1", "-4").unwrap();
        assert!(reply.contains("Negative"));
        let reply = chat.handle(&conn, "u1", "33").unwrap();
        assert!(reply.contains("+33 → 33 today"));
        assert!(chat.sessions().is_empty());
    }

    #[test]
    fn other_command_drops_a_pending_question() {
        let (conn, mut chat) = setup();
        onboard(&conn, &mut chat, "u1");

        chat.handle(&conn, "u1", "/add dua").unwrap();
        chat.handle(&conn, "u1", "/today").unwrap();
        let reply = chat.handle(&conn, "u1", "3").unwrap();
        assert!(reply.contains("/help"));
        let record = DayRepo::get_or_empty(&conn, "u1", "2026-02-20").unwrap();
        assert_eq!(record.dua, 0);
    }

    #[test]
    fn wipe_needs_confirmation() {
        let (conn, mut chat) = setup();
        onboard(&conn, &mut chat, "u1");
        chat.handle(&conn, "u1", "/add charity 10").unwrap();

        chat.handle(&conn, "u1", "/wipe").unwrap();
        let reply = chat.handle(&conn, "u1", "no").unwrap();
        assert_eq!(reply, "Nothing was deleted.");
        assert_eq!(DayRepo::get_all(&conn, "u1").unwrap().len(), 1);

        chat.handle(&conn, "u1", "/wipe").unwrap();
        let reply = chat.handle(&conn, "u1", "YES").unwrap();
        assert!(reply.contains("deleted"));
        assert!(DayRepo::get_all(&conn, "u1").unwrap().is_empty());
        assert!(!UserRepo::is_setup_done(&conn, "u1").unwrap());
    }

    #[test]
    fn stats_and_remaining() {
        let (conn, mut chat) = setup();
        onboard(&conn, &mut chat, "u1");

        let reply = chat.handle(&conn, "u1", "/remaining").unwrap();
        assert!(reply.contains("📖 Quran: 20 pages left"));
        assert!(!reply.contains("Taraweeh"));

        chat.handle(&conn, "u1", "/add quran 20").unwrap();
        let reply = chat.handle(&conn, "u1", "/stats").unwrap();
        assert!(reply.contains("days tracked: 1"));
        assert!(reply.contains("🔥 Streak: 1"));
    }

    #[test]
    fn goals_command_reopens_setup() {
        let (conn, mut chat) = setup();
        onboard(&conn, &mut chat, "u1");

        chat.handle(&conn, "u1", "/goals").unwrap();
        assert!(!UserRepo::is_setup_done(&conn, "u1").unwrap());
        assert_eq!(chat.handle(&conn, "u1", "/cancel").unwrap(), "Cancelled.");
        assert_eq!(chat.handle(&conn, "u1", "/cancel").unwrap(), "Nothing to cancel.");
    }

    #[test]
    fn unknown_command_and_extended_flag() {
        let (conn, mut chat) = setup();
        onboard(&conn, &mut chat, "u1");
        let reply = chat.handle(&conn, "u1", "/fly").unwrap();
        assert!(reply.contains("Unknown command /fly"));
        let reply = chat.handle(&conn, "u1", "/toggle duha").unwrap();
        assert!(reply.starts_with("☀"));
    }
}
