//! Ledger trait and error types

use thiserror::Error;

/// Errors that can occur while reading or writing the visited ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Ledger lock poisoned")]
    Poisoned,
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// The shared record of URLs whose processing has started
///
/// Implementations must make [`check_and_mark`](VisitedLedger::check_and_mark)
/// a single atomic test-and-set with respect to every worker that shares the
/// ledger. Splitting it into a read followed by a later write lets two workers
/// both see "not visited" and fetch the same page.
pub trait VisitedLedger: Send + Sync {
    /// Records `url` as visited
    ///
    /// Returns `true` if this call recorded it, `false` if it was already present.
    fn check_and_mark(&self, url: &str) -> LedgerResult<bool>;

    /// Returns true if `url` is recorded
    ///
    /// The answer may be stale by the time the caller acts on it; use it only
    /// for optimizations, never to decide whether to fetch.
    fn contains(&self, url: &str) -> LedgerResult<bool>;

    /// Number of recorded URLs
    fn len(&self) -> LedgerResult<u64>;

    fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }
}
