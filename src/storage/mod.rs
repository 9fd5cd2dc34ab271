//! Page storage
//!
//! Every successfully fetched page is written to its own file in one
//! directory. The downstream indexer reads that directory; nothing else about
//! the layout is promised.

mod page_store;

pub use page_store::{PageId, PageRecord, PageStore, StoreError, StoreResult};

use crate::config::StorageConfig;

/// Opens the page store described by the configuration
pub fn open_store(config: &StorageConfig) -> StoreResult<PageStore> {
    PageStore::open(&config.pages_dir, &config.extension)
}
