use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            created_at  TEXT DEFAULT (datetime('now')),
            setup_done  INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS goals (
            user_id      TEXT PRIMARY KEY,
            quran_pages  INTEGER,
            istighfar    INTEGER,
            dhikr        INTEGER,
            charity      INTEGER,
            dua          INTEGER
        );

        CREATE TABLE IF NOT EXISTS days (
            user_id         TEXT NOT NULL,
            date            TEXT NOT NULL,
            quran_pages     INTEGER NOT NULL DEFAULT 0,
            fajr            INTEGER NOT NULL DEFAULT 0,
            dhuhr           INTEGER NOT NULL DEFAULT 0,
            asr             INTEGER NOT NULL DEFAULT 0,
            maghrib         INTEGER NOT NULL DEFAULT 0,
            isha            INTEGER NOT NULL DEFAULT 0,
            taraweeh        INTEGER NOT NULL DEFAULT 0,
            tahajjud        INTEGER NOT NULL DEFAULT 0,
            morning_adhkar  INTEGER NOT NULL DEFAULT 0,
            evening_adhkar  INTEGER NOT NULL DEFAULT 0,
            duha            INTEGER NOT NULL DEFAULT 0,
            istighfar       INTEGER NOT NULL DEFAULT 0,
            dhikr           INTEGER NOT NULL DEFAULT 0,
            charity         INTEGER NOT NULL DEFAULT 0,
            dua             INTEGER NOT NULL DEFAULT 0,
            updated_at      TEXT NOT NULL,
            PRIMARY KEY (user_id, date)
        );
    ")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users','goals','days')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }
}
