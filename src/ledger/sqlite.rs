//! SQLite ledger implementation
//!
//! The `visited` table's primary key makes `INSERT OR IGNORE` the atomic
//! test-and-set: SQLite serializes writers across every connection and
//! process that opens the same file.

use crate::ledger::traits::{LedgerError, LedgerResult, VisitedLedger};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

const LEDGER_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS visited (
    url TEXT PRIMARY KEY NOT NULL,
    visited_at TEXT NOT NULL
);
"#;

/// Visited ledger stored in a SQLite database
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Opens (or creates) the ledger in the database file at `path`
    ///
    /// The file may be shared with the work queue and with other processes.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(10))?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        conn.execute_batch(LEDGER_SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory ledger (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(LEDGER_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl VisitedLedger for SqliteLedger {
    fn check_and_mark(&self, url: &str) -> LedgerResult<bool> {
        let conn = self.conn.lock().map_err(|_| LedgerError::Poisoned)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO visited (url, visited_at) VALUES (?1, ?2)",
            params![url, Utc::now().to_rfc3339()],
        )?;
        Ok(inserted == 1)
    }

    fn contains(&self, url: &str) -> LedgerResult<bool> {
        let conn = self.conn.lock().map_err(|_| LedgerError::Poisoned)?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM visited WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn len(&self) -> LedgerResult<u64> {
        let conn = self.conn.lock().map_err(|_| LedgerError::Poisoned)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM visited", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn test_check_and_mark_twice() {
        let ledger = SqliteLedger::new_in_memory().unwrap();
        assert!(ledger.check_and_mark("https://example.com/a").unwrap());
        assert!(!ledger.check_and_mark("https://example.com/a").unwrap());
    }

    #[test]
    fn test_contains_and_len() {
        let ledger = SqliteLedger::new_in_memory().unwrap();
        assert!(ledger.is_empty().unwrap());

        ledger.check_and_mark("https://example.com/a").unwrap();
        assert!(ledger.contains("https://example.com/a").unwrap());
        assert!(!ledger.contains("https://example.com/b").unwrap());
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn test_separate_connections_share_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        let first = SqliteLedger::open(&path).unwrap();
        let second = SqliteLedger::open(&path).unwrap();

        assert!(first.check_and_mark("https://example.com/a").unwrap());
        assert!(!second.check_and_mark("https://example.com/a").unwrap());
        assert!(second.contains("https://example.com/a").unwrap());
    }

    #[test]
    fn test_concurrent_connections_get_one_true() {
        // One connection per thread stands in for one connection per process
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        SqliteLedger::open(&path).unwrap();

        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let path = path.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let ledger = SqliteLedger::open(&path).unwrap();
                    barrier.wait();
                    ledger.check_and_mark("https://example.com/race").unwrap()
                })
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(wins, 1);
    }
}
