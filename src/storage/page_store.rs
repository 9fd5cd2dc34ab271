//! Directory-backed page store

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Errors that can occur while persisting pages
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to move page into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const PARTIAL_PREFIX: &str = ".partial-";

/// Temp files younger than this may belong to a write still in progress elsewhere
const STALE_PARTIAL_AGE: Duration = Duration::from_secs(10 * 60);

/// Result type for page store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Globally unique identifier of a stored page
///
/// A random v4 UUID rendered as 32 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageId(String);

impl PageId {
    fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A page written to the store
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: PageId,
    pub origin: Url,
    pub path: PathBuf,
}

/// A directory holding one file per crawled page
///
/// Files are named `<page id>.<extension>` and contain the decoded body.
#[derive(Debug, Clone)]
pub struct PageStore {
    dir: PathBuf,
    extension: String,
}

impl PageStore {
    /// Opens the store, creating the directory if needed
    ///
    /// Temp files left behind by writers that died mid-save are removed.
    pub fn open(dir: &Path, extension: &str) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;
        let store = Self {
            dir: dir.to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
        };

        let swept = store.sweep_partials(STALE_PARTIAL_AGE)?;
        if swept > 0 {
            tracing::info!(
                "Removed {} abandoned partial pages from {}",
                swept,
                store.dir.display()
            );
        }

        Ok(store)
    }

    /// Deletes `.partial-*` temp files last modified more than `older_than` ago
    pub fn sweep_partials(&self, older_than: Duration) -> StoreResult<usize> {
        let now = SystemTime::now();
        let mut removed = 0;

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let is_partial = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(PARTIAL_PREFIX));
            if !is_partial {
                continue;
            }

            let modified = entry.metadata()?.modified()?;
            let age = now.duration_since(modified).unwrap_or_default();
            if age < older_than {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                // Another process swept it first
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(removed)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists `content` fetched from `origin` under a fresh identifier
    ///
    /// The file appears under its final name only once fully written, so
    /// readers of the directory never see a partial page.
    pub fn save(&self, origin: &Url, content: &str) -> StoreResult<PageRecord> {
        let id = PageId::generate();
        let path = self.dir.join(format!("{}.{}", id, self.extension));

        // Temp file in the same directory so the rename never crosses filesystems
        let mut tmp = tempfile::Builder::new()
            .prefix(PARTIAL_PREFIX)
            .tempfile_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;

        tmp.persist_noclobber(&path).map_err(|e| StoreError::Persist {
            path: path.clone(),
            source: e.error,
        })?;

        tracing::debug!("Stored {} as {}", origin, path.display());

        Ok(PageRecord {
            id,
            origin: origin.clone(),
            path,
        })
    }

    /// Number of stored pages
    pub fn count_pages(&self) -> StoreResult<u64> {
        let mut count = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str()) {
                count += 1;
            }
        }
        Ok(count)
    }
}
