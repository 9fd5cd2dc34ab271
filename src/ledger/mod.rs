//! Visited ledger: the authoritative set of URLs the crawl has taken on
//!
//! Workers call [`VisitedLedger::check_and_mark`] once per delivery; only the
//! caller that gets `true` fetches the page. Entries are never removed during
//! a crawl run.

mod file;
mod memory;
mod sqlite;
mod traits;

pub use file::FileLedger;
pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;
pub use traits::{LedgerError, LedgerResult, VisitedLedger};

use crate::config::{LedgerBackend, LedgerConfig};
use std::sync::Arc;

/// Opens the ledger backend selected in the configuration
pub fn open_ledger(config: &LedgerConfig) -> LedgerResult<Arc<dyn VisitedLedger>> {
    let ledger: Arc<dyn VisitedLedger> = match config.backend {
        LedgerBackend::Sqlite => Arc::new(SqliteLedger::open(&config.path)?),
        LedgerBackend::File => Arc::new(FileLedger::open(&config.path)?),
        LedgerBackend::Memory => Arc::new(MemoryLedger::new()),
    };

    tracing::debug!("Opened {:?} visited ledger", config.backend);
    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_each_backend() {
        let dir = tempdir().unwrap();

        for (backend, file) in [
            (LedgerBackend::Sqlite, "ledger.db"),
            (LedgerBackend::File, "visited.txt"),
            (LedgerBackend::Memory, "unused"),
        ] {
            let config = LedgerConfig {
                backend,
                path: dir.path().join(file),
            };
            let ledger = open_ledger(&config).unwrap();
            assert!(ledger.check_and_mark("https://example.com/").unwrap());
            assert!(!ledger.check_and_mark("https://example.com/").unwrap());
        }
    }
}
