//! Append-only text file ledger
//!
//! On-disk format: UTF-8, one URL per line, only ever appended to. The whole
//! file is the historical set of visited URLs.

use crate::ledger::traits::{LedgerError, LedgerResult, VisitedLedger};
use fd_lock::RwLock;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

struct FileLedgerInner {
    file: RwLock<File>,
    visited: HashSet<String>,
    /// Bytes of the file already folded into `visited`
    offset: u64,
}

/// Visited ledger persisted as a line-oriented text file
///
/// Every operation takes an advisory lock on the file and first reads the
/// lines other handles appended since the last call, so any number of
/// processes can share one file. `check_and_mark` holds the exclusive lock
/// across the lookup and the append.
pub struct FileLedger {
    path: PathBuf,
    inner: Mutex<FileLedgerInner>,
}

impl FileLedger {
    /// Opens (or creates) the ledger file at `path`
    pub fn open(path: &Path) -> LedgerResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;

        let mut inner = FileLedgerInner {
            file: RwLock::new(file),
            visited: HashSet::new(),
            offset: 0,
        };
        {
            let FileLedgerInner {
                file,
                visited,
                offset,
            } = &mut inner;
            let guard = file.read()?;
            catch_up(&guard, visited, offset)?;
        }

        tracing::debug!(
            "Loaded {} visited URLs from {}",
            inner.visited.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(inner),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Folds every complete line past `offset` into `visited`
///
/// Returns true when the file ends in a partial line (a writer died mid-append).
fn catch_up(mut file: &File, visited: &mut HashSet<String>, offset: &mut u64) -> io::Result<bool> {
    file.seek(SeekFrom::Start(*offset))?;
    let mut tail = Vec::new();
    file.read_to_end(&mut tail)?;

    let complete = match tail.iter().rposition(|b| *b == b'\n') {
        Some(last) => last + 1,
        None => 0,
    };

    for line in String::from_utf8_lossy(&tail[..complete]).lines() {
        let url = line.trim();
        if !url.is_empty() {
            visited.insert(url.to_string());
        }
    }

    *offset += complete as u64;
    Ok(complete < tail.len())
}

impl VisitedLedger for FileLedger {
    fn check_and_mark(&self, url: &str) -> LedgerResult<bool> {
        let mut inner = self.inner.lock().map_err(|_| LedgerError::Poisoned)?;
        let FileLedgerInner {
            file,
            visited,
            offset,
        } = &mut *inner;

        let guard = file.write()?;
        let partial = catch_up(&guard, visited, offset)?;

        if visited.contains(url) {
            return Ok(false);
        }

        // Write first so a failed append leaves the URL unrecorded everywhere
        let line = if partial {
            format!("\n{}\n", url)
        } else {
            format!("{}\n", url)
        };
        let mut writer: &File = &guard;
        writer.write_all(line.as_bytes())?;
        writer.flush()?;

        // Fold our own line in so the offset sits at the end of the file
        catch_up(&guard, visited, offset)?;
        Ok(true)
    }

    fn contains(&self, url: &str) -> LedgerResult<bool> {
        let mut inner = self.inner.lock().map_err(|_| LedgerError::Poisoned)?;
        let FileLedgerInner {
            file,
            visited,
            offset,
        } = &mut *inner;

        let guard = file.read()?;
        catch_up(&guard, visited, offset)?;
        Ok(visited.contains(url))
    }

    fn len(&self) -> LedgerResult<u64> {
        let mut inner = self.inner.lock().map_err(|_| LedgerError::Poisoned)?;
        let FileLedgerInner {
            file,
            visited,
            offset,
        } = &mut *inner;

        let guard = file.read()?;
        catch_up(&guard, visited, offset)?;
        Ok(visited.len() as u64)
    }
}
