use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{
    Counter, DayMap, DayRecord, Flag, Goals, MosqueAttendance, Prayer, StoredGoals,
};

// ─── Row helpers ─────────────────────────────────────────────────────────────

const DAY_COLUMNS: &str = "date, quran_pages, fajr, dhuhr, asr, maghrib, isha,
    taraweeh, tahajjud, morning_adhkar, evening_adhkar, duha,
    istighfar, dhikr, charity, dua, updated_at";

/// Negative or oversized values from a hand-edited database read as the
/// nearest valid count.
fn count(row: &Row, col: &str) -> rusqlite::Result<u32> {
    let v: i64 = row.get(col)?;
    Ok(v.clamp(0, u32::MAX as i64) as u32)
}

fn flag(row: &Row, col: &str) -> rusqlite::Result<bool> {
    Ok(row.get::<_, i64>(col)? != 0)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(t) => t.with_timezone(&Utc),
        Err(e) => {
            warn!("Bad updated_at '{}': {}", s, e);
            DateTime::<Utc>::default()
        }
    }
}

fn day_from_row(row: &Row) -> rusqlite::Result<(String, DayRecord)> {
    let date: String = row.get("date")?;
    let updated_at: String = row.get("updated_at")?;
    let record = DayRecord {
        quran_pages: count(row, "quran_pages")?,
        mosque: MosqueAttendance {
            fajr: flag(row, "fajr")?,
            dhuhr: flag(row, "dhuhr")?,
            asr: flag(row, "asr")?,
            maghrib: flag(row, "maghrib")?,
            isha: flag(row, "isha")?,
        },
        taraweeh: flag(row, "taraweeh")?,
        tahajjud: flag(row, "tahajjud")?,
        morning_adhkar: flag(row, "morning_adhkar")?,
        evening_adhkar: flag(row, "evening_adhkar")?,
        duha: flag(row, "duha")?,
        istighfar: count(row, "istighfar")?,
        dhikr: count(row, "dhikr")?,
        charity: count(row, "charity")?,
        dua: count(row, "dua")?,
        updated_at: parse_timestamp(&updated_at),
    };
    Ok((date, record))
}

// ─── Day repo ────────────────────────────────────────────────────────────────

/// Per-user, per-date day records. Every mutation is a single SQL statement,
/// so concurrent writers to the same day never lose an update.
pub struct DayRepo;

impl DayRepo {
    /// Create an empty record for the date if none exists.
    pub fn ensure(conn: &Connection, user: &str, date: &str, now: DateTime<Utc>) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO days (user_id, date, updated_at) VALUES (?1, ?2, ?3)",
            params![user, date, now.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get(conn: &Connection, user: &str, date: &str) -> Result<Option<DayRecord>> {
        let sql = format!("SELECT {} FROM days WHERE user_id = ?1 AND date = ?2", DAY_COLUMNS);
        let row = conn
            .query_row(&sql, params![user, date], day_from_row)
            .optional()?;
        Ok(row.map(|(_, record)| record))
    }

    /// A missing day reads as an empty one.
    pub fn get_or_empty(conn: &Connection, user: &str, date: &str) -> Result<DayRecord> {
        Ok(Self::get(conn, user, date)?.unwrap_or_default())
    }

    pub fn get_all(conn: &Connection, user: &str) -> Result<DayMap> {
        let sql = format!(
            "SELECT {} FROM days WHERE user_id = ?1 ORDER BY date",
            DAY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user], day_from_row)?;
        rows.collect::<rusqlite::Result<DayMap>>()
            .map_err(anyhow::Error::from)
    }

    pub fn increment(
        conn: &Connection,
        user: &str,
        date: &str,
        counter: Counter,
        amount: u32,
        now: DateTime<Utc>,
    ) -> Result<DayRecord> {
        Self::ensure(conn, user, date, now)?;
        let col = counter.column();
        let sql = format!(
            "UPDATE days SET {col} = {col} + ?3, updated_at = ?4 WHERE user_id = ?1 AND date = ?2"
        );
        conn.execute(&sql, params![user, date, amount as i64, now.to_rfc3339()])?;
        debug!("{} {}: +{} {}", user, date, amount, counter.as_str());
        Self::get_or_empty(conn, user, date)
    }

    pub fn toggle_flag(
        conn: &Connection,
        user: &str,
        date: &str,
        flag: Flag,
        now: DateTime<Utc>,
    ) -> Result<DayRecord> {
        Self::toggle_column(conn, user, date, flag.column(), now)
    }

    pub fn toggle_prayer(
        conn: &Connection,
        user: &str,
        date: &str,
        prayer: Prayer,
        now: DateTime<Utc>,
    ) -> Result<DayRecord> {
        Self::toggle_column(conn, user, date, prayer.column(), now)
    }

    fn toggle_column(
        conn: &Connection,
        user: &str,
        date: &str,
        col: &'static str,
        now: DateTime<Utc>,
    ) -> Result<DayRecord> {
        Self::ensure(conn, user, date, now)?;
        let sql = format!(
            "UPDATE days SET {col} = CASE {col} WHEN 0 THEN 1 ELSE 0 END, updated_at = ?3
             WHERE user_id = ?1 AND date = ?2"
        );
        conn.execute(&sql, params![user, date, now.to_rfc3339()])?;
        debug!("{} {}: toggled {}", user, date, col);
        Self::get_or_empty(conn, user, date)
    }

    /// Replace the whole record with an empty one.
    pub fn reset(conn: &Connection, user: &str, date: &str, now: DateTime<Utc>) -> Result<DayRecord> {
        conn.execute(
            "INSERT OR REPLACE INTO days (user_id, date, updated_at) VALUES (?1, ?2, ?3)",
            params![user, date, now.to_rfc3339()],
        )?;
        info!("{} {}: day reset", user, date);
        Ok(DayRecord::empty(now))
    }
}

// ─── User repo ───────────────────────────────────────────────────────────────

pub struct UserRepo;

impl UserRepo {
    /// Returns true when the user was created by this call.
    pub fn ensure(conn: &Connection, user: &str) -> Result<bool> {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (id, setup_done) VALUES (?1, 0)",
            params![user],
        )?;
        if inserted > 0 {
            info!("Created user {}", user);
        }
        Ok(inserted > 0)
    }

    pub fn is_setup_done(conn: &Connection, user: &str) -> Result<bool> {
        let done: Option<i64> = conn
            .query_row(
                "SELECT setup_done FROM users WHERE id = ?1",
                params![user],
                |row| row.get(0),
            )
            .optional()?;
        Ok(done.unwrap_or(0) != 0)
    }

    pub fn set_setup_done(conn: &Connection, user: &str, done: bool) -> Result<()> {
        Self::ensure(conn, user)?;
        conn.execute(
            "UPDATE users SET setup_done = ?2 WHERE id = ?1",
            params![user, done as i32],
        )?;
        Ok(())
    }

    /// Users who finished goal setup, in id order.
    pub fn list_ready(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn.prepare("SELECT id FROM users WHERE setup_done = 1 ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }

    /// Remove the user, their goals and every day record. Irreversible.
    pub fn wipe(conn: &Connection, user: &str) -> Result<usize> {
        let tx = conn.unchecked_transaction()?;
        let days = tx.execute("DELETE FROM days WHERE user_id = ?1", params![user])?;
        tx.execute("DELETE FROM goals WHERE user_id = ?1", params![user])?;
        tx.execute("DELETE FROM users WHERE id = ?1", params![user])?;
        tx.commit()?;
        info!("Wiped user {} ({} days)", user, days);
        Ok(days)
    }
}

// ─── Goals repo ──────────────────────────────────────────────────────────────

pub struct GoalsRepo;

impl GoalsRepo {
    pub fn get(conn: &Connection, user: &str) -> Result<Option<StoredGoals>> {
        conn.query_row(
            "SELECT quran_pages, istighfar, dhikr, charity, dua FROM goals WHERE user_id = ?1",
            params![user],
            |row| {
                let goal = |i: usize| -> rusqlite::Result<Option<u32>> {
                    let v: Option<i64> = row.get(i)?;
                    Ok(v.map(|v| v.clamp(0, u32::MAX as i64) as u32))
                };
                Ok(StoredGoals {
                    quran_pages: goal(0)?,
                    istighfar: goal(1)?,
                    dhikr: goal(2)?,
                    charity: goal(3)?,
                    dua: goal(4)?,
                })
            },
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    /// Stored goals merged over `defaults`.
    pub fn resolve(conn: &Connection, user: &str, defaults: &Goals) -> Result<Goals> {
        Ok(Self::get(conn, user)?
            .map(|g| g.resolve(defaults))
            .unwrap_or(*defaults))
    }

    /// Write one goal, leaving the others untouched.
    pub fn set(conn: &Connection, user: &str, counter: Counter, value: u32) -> Result<()> {
        let col = counter.column();
        let sql = format!(
            "INSERT INTO goals (user_id, {col}) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET {col} = ?2"
        );
        conn.execute(&sql, params![user, value as i64])?;
        debug!("{}: goal {} = {}", user, counter.as_str(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn missing_day_reads_as_empty() {
        let conn = conn();
        assert!(DayRepo::get(&conn, "u1", "2026-02-18").unwrap().is_none());
        let record = DayRepo::get_or_empty(&conn, "u1", "2026-02-18").unwrap();
        assert_eq!(record.quran_pages, 0);
        assert_eq!(record.mosque_count(), 0);
    }

    #[test]
    fn ensure_is_idempotent_and_keeps_data() {
        let conn = conn();
        let now = Utc::now();
        DayRepo::increment(&conn, "u1", "2026-02-18", Counter::Dua, 2, now).unwrap();
        DayRepo::ensure(&conn, "u1", "2026-02-18", now).unwrap();
        let record = DayRepo::get(&conn, "u1", "2026-02-18").unwrap().unwrap();
        assert_eq!(record.dua, 2);
    }

    #[test]
    fn increments_accumulate() {
        let conn = conn();
        let now = Utc::now();
        DayRepo::increment(&conn, "u1", "2026-02-18", Counter::QuranPages, 5, now).unwrap();
        let record =
            DayRepo::increment(&conn, "u1", "2026-02-18", Counter::QuranPages, 7, now).unwrap();
        assert_eq!(record.quran_pages, 12);
        assert_eq!(record.istighfar, 0);
    }

    #[test]
    fn toggles_flip_flags_and_prayers() {
        let conn = conn();
        let now = Utc::now();
        let r = DayRepo::toggle_flag(&conn, "u1", "2026-02-18", Flag::Tahajjud, now).unwrap();
        assert!(r.tahajjud);
        let r = DayRepo::toggle_prayer(&conn, "u1", "2026-02-18", Prayer::Fajr, now).unwrap();
        assert!(r.attended(Prayer::Fajr));
        assert!(r.tahajjud);
        let r = DayRepo::toggle_flag(&conn, "u1", "2026-02-18", Flag::Tahajjud, now).unwrap();
        assert!(!r.tahajjud);
    }

    #[test]
    fn reset_replaces_the_record() {
        let conn = conn();
        let now = Utc::now();
        DayRepo::increment(&conn, "u1", "2026-02-18", Counter::Charity, 50, now).unwrap();
        DayRepo::toggle_prayer(&conn, "u1", "2026-02-18", Prayer::Isha, now).unwrap();
        DayRepo::reset(&conn, "u1", "2026-02-18", now).unwrap();
        let record = DayRepo::get(&conn, "u1", "2026-02-18").unwrap().unwrap();
        assert_eq!(record.charity, 0);
        assert!(!record.attended(Prayer::Isha));
    }

    #[test]
    fn reset_day_scores_zero() {
        use crate::tracker::{score_day, DimensionSet};

        let conn = conn();
        let now = Utc::now();
        let date = "2026-02-18";
        for prayer in Prayer::ALL {
            DayRepo::toggle_prayer(&conn, "u1", date, prayer, now).unwrap();
        }
        for flag in [Flag::Taraweeh, Flag::Tahajjud, Flag::MorningAdhkar, Flag::Duha] {
            DayRepo::toggle_flag(&conn, "u1", date, flag, now).unwrap();
        }
        DayRepo::increment(&conn, "u1", date, Counter::QuranPages, 20, now).unwrap();
        DayRepo::increment(&conn, "u1", date, Counter::Istighfar, 500, now).unwrap();
        DayRepo::increment(&conn, "u1", date, Counter::Charity, 100, now).unwrap();

        let goals = Goals::default();
        let before = DayRepo::get(&conn, "u1", date).unwrap().unwrap();
        assert!(score_day(&before, &goals, &DimensionSet::base()).completed > 0);

        DayRepo::reset(&conn, "u1", date, now).unwrap();
        let after = DayRepo::get(&conn, "u1", date).unwrap().unwrap();
        for dims in [DimensionSet::base(), DimensionSet::extended()] {
            assert_eq!(score_day(&after, &goals, &dims).completed, 0);
        }
    }

    #[test]
    fn get_all_is_ordered_and_scoped_to_user() {
        let conn = conn();
        let now = Utc::now();
        DayRepo::ensure(&conn, "u1", "2026-02-20", now).unwrap();
        DayRepo::ensure(&conn, "u1", "2026-02-18", now).unwrap();
        DayRepo::ensure(&conn, "u2", "2026-02-19", now).unwrap();
        let days = DayRepo::get_all(&conn, "u1").unwrap();
        let keys: Vec<&String> = days.keys().collect();
        assert_eq!(keys, vec!["2026-02-18", "2026-02-20"]);
    }

    #[test]
    fn negative_columns_clamp_to_zero() {
        let conn = conn();
        DayRepo::ensure(&conn, "u1", "2026-02-18", Utc::now()).unwrap();
        conn.execute("UPDATE days SET dhikr = -40 WHERE user_id = 'u1'", [])
            .unwrap();
        let record = DayRepo::get(&conn, "u1", "2026-02-18").unwrap().unwrap();
        assert_eq!(record.dhikr, 0);
    }

    #[test]
    fn goals_merge_one_field_at_a_time() {
        let conn = conn();
        assert!(GoalsRepo::get(&conn, "u1").unwrap().is_none());
        GoalsRepo::set(&conn, "u1", Counter::QuranPages, 10).unwrap();
        GoalsRepo::set(&conn, "u1", Counter::Dua, 5).unwrap();
        GoalsRepo::set(&conn, "u1", Counter::QuranPages, 12).unwrap();

        let stored = GoalsRepo::get(&conn, "u1").unwrap().unwrap();
        assert_eq!(stored.quran_pages, Some(12));
        assert_eq!(stored.dua, Some(5));
        assert_eq!(stored.dhikr, None);

        let goals = GoalsRepo::resolve(&conn, "u1", &Goals::default()).unwrap();
        assert_eq!(goals.quran_pages, 12);
        assert_eq!(goals.dhikr, 100);
    }

    #[test]
    fn setup_flag_and_ready_list() {
        let conn = conn();
        assert!(UserRepo::ensure(&conn, "b").unwrap());
        assert!(!UserRepo::ensure(&conn, "b").unwrap());
        UserRepo::ensure(&conn, "a").unwrap();
        assert!(!UserRepo::is_setup_done(&conn, "a").unwrap());
        UserRepo::set_setup_done(&conn, "a", true).unwrap();
        UserRepo::set_setup_done(&conn, "b", true).unwrap();
        UserRepo::set_setup_done(&conn, "b", false).unwrap();
        assert_eq!(UserRepo::list_ready(&conn).unwrap(), vec!["a".to_string()]);
        assert!(!UserRepo::is_setup_done(&conn, "nobody").unwrap());
    }

    #[test]
    fn wipe_removes_everything_for_one_user() {
        let conn = conn();
        let now = Utc::now();
        UserRepo::ensure(&conn, "u1").unwrap();
        UserRepo::ensure(&conn, "u2").unwrap();
        GoalsRepo::set(&conn, "u1", Counter::Dhikr, 33).unwrap();
        DayRepo::ensure(&conn, "u1", "2026-02-18", now).unwrap();
        DayRepo::ensure(&conn, "u1", "2026-02-19", now).unwrap();
        DayRepo::ensure(&conn, "u2", "2026-02-18", now).unwrap();

        assert_eq!(UserRepo::wipe(&conn, "u1").unwrap(), 2);
        assert!(DayRepo::get_all(&conn, "u1").unwrap().is_empty());
        assert!(GoalsRepo::get(&conn, "u1").unwrap().is_none());
        assert_eq!(DayRepo::get_all(&conn, "u2").unwrap().len(), 1);
    }
}
