//! In-process ledger backed by a mutex-guarded set

use crate::ledger::traits::{LedgerError, LedgerResult, VisitedLedger};
use std::collections::HashSet;
use std::sync::Mutex;

/// Visited ledger held in process memory
///
/// Shared by the workers of one process through an `Arc`. Contents are lost
/// when the process exits.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    visited: Mutex<HashSet<String>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisitedLedger for MemoryLedger {
    fn check_and_mark(&self, url: &str) -> LedgerResult<bool> {
        let mut visited = self.visited.lock().map_err(|_| LedgerError::Poisoned)?;
        Ok(visited.insert(url.to_string()))
    }

    fn contains(&self, url: &str) -> LedgerResult<bool> {
        let visited = self.visited.lock().map_err(|_| LedgerError::Poisoned)?;
        Ok(visited.contains(url))
    }

    fn len(&self) -> LedgerResult<u64> {
        let visited = self.visited.lock().map_err(|_| LedgerError::Poisoned)?;
        Ok(visited.len() as u64)
    }
}
