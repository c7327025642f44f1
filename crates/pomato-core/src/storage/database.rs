//! SQLite-backed persistence.
//!
//! Two tables:
//! - `counters`: numeric values that expire at the next local midnight,
//!   the day-scoped statistics store.
//! - `kv`: non-expiring JSON blobs, used to carry the session state
//!   between CLI invocations.

use chrono::{DateTime, Days, Local, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::StorageError;

use super::data_dir;

/// Day-scoped counter store plus a generic key-value table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/pomato/pomato.db`.
    ///
    /// Creates the file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be
    /// opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?
            .join("pomato.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS counters (
                key        TEXT PRIMARY KEY,
                value      INTEGER NOT NULL,
                expires_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    // ── Day-scoped counters ──────────────────────────────────────────

    /// Store a counter value, stamped to expire at the next local
    /// midnight. Values never outlive the calendar day they were
    /// written in.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn save_counter(&self, key: &str, value: u64) -> Result<(), StorageError> {
        self.save_counter_at(key, value, Local::now())
    }

    /// Load a counter value, or `None` if absent or expired. An expired
    /// entry is evicted as a side effect.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn load_counter(&self, key: &str) -> Result<Option<u64>, StorageError> {
        self.load_counter_at(key, Local::now())
    }

    fn save_counter_at(
        &self,
        key: &str,
        value: u64,
        now: DateTime<Local>,
    ) -> Result<(), StorageError> {
        let expires_at = next_midnight(now).to_rfc3339();
        // SQLite integers are i64; clamp rather than wrap.
        let value = i64::try_from(value).unwrap_or(i64::MAX);
        self.conn.execute(
            "INSERT INTO counters (key, value, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, expires_at = ?3",
            params![key, value, expires_at],
        )?;
        Ok(())
    }

    fn load_counter_at(
        &self,
        key: &str,
        now: DateTime<Local>,
    ) -> Result<Option<u64>, StorageError> {
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT value, expires_at FROM counters WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((value, expires_at)) = row else {
            return Ok(None);
        };

        // An unparseable expiry counts as expired.
        let alive = DateTime::parse_from_rfc3339(&expires_at)
            .map(|expiry| now.with_timezone(&Utc) <= expiry.with_timezone(&Utc))
            .unwrap_or(false);
        if !alive {
            self.conn
                .execute("DELETE FROM counters WHERE key = ?1", params![key])?;
            return Ok(None);
        }
        Ok(Some(value as u64))
    }

    // ── Key-value blobs ──────────────────────────────────────────────

    /// Read a kv entry.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Write a kv entry.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Midnight at the start of the day after `now`, in local time.
fn next_midnight(now: DateTime<Local>) -> DateTime<Local> {
    let tomorrow = now.date_naive() + Days::new(1);
    tomorrow
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .unwrap_or_else(|| now + chrono::Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn kv_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("state").unwrap().is_none());
        db.kv_set("state", "{\"phase\":\"idle\"}").unwrap();
        assert_eq!(db.kv_get("state").unwrap().unwrap(), "{\"phase\":\"idle\"}");
        db.kv_set("state", "{}").unwrap();
        assert_eq!(db.kv_get("state").unwrap().unwrap(), "{}");
    }

    #[test]
    fn counter_roundtrips_within_the_day() {
        let db = Database::open_memory().unwrap();
        db.save_counter("seconds_worked", 120).unwrap();
        assert_eq!(db.load_counter("seconds_worked").unwrap(), Some(120));
    }

    #[test]
    fn oversized_counter_value_clamps_instead_of_wrapping() {
        let db = Database::open_memory().unwrap();
        db.save_counter("seconds_worked", u64::MAX).unwrap();
        assert_eq!(
            db.load_counter("seconds_worked").unwrap(),
            Some(i64::MAX as u64)
        );
    }

    #[test]
    fn counter_absent_when_never_saved() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.load_counter("missing").unwrap(), None);
    }

    #[test]
    fn counter_expires_after_midnight_and_is_evicted() {
        let db = Database::open_memory().unwrap();
        let yesterday = Local::now() - Duration::days(1);
        db.save_counter_at("seconds_worked", 120, yesterday).unwrap();

        assert_eq!(
            db.load_counter_at("seconds_worked", Local::now()).unwrap(),
            None
        );
        // Eviction happened: the row is gone even for a reader at the
        // old timestamp.
        assert_eq!(
            db.load_counter_at("seconds_worked", yesterday).unwrap(),
            None
        );
    }

    #[test]
    fn counter_alive_right_up_to_its_expiry() {
        let db = Database::open_memory().unwrap();
        let now = Local::now();
        db.save_counter_at("pomodoros_completed", 3, now).unwrap();
        let expiry = next_midnight(now);
        assert_eq!(
            db.load_counter_at("pomodoros_completed", expiry).unwrap(),
            Some(3)
        );
        assert_eq!(
            db.load_counter_at("pomodoros_completed", expiry + Duration::seconds(1))
                .unwrap(),
            None
        );
    }

    #[test]
    fn corrupt_expiry_counts_as_expired() {
        let db = Database::open_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO counters (key, value, expires_at) VALUES ('k', 5, 'not-a-date')",
                [],
            )
            .unwrap();
        assert_eq!(db.load_counter("k").unwrap(), None);
    }

    #[test]
    fn next_midnight_is_start_of_tomorrow() {
        let now = Local::now();
        let midnight = next_midnight(now);
        assert!(midnight > now);
        assert_eq!(midnight.date_naive(), now.date_naive() + Days::new(1));
    }

    #[test]
    fn open_at_creates_file_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pomato.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.save_counter("seconds_rested", 45).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.load_counter("seconds_rested").unwrap(), Some(45));
    }
}
