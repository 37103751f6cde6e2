//! Attribution result caching
//!
//! Keyed by (file path, head reference). A new head reference is a new key,
//! so stale entries are stranded rather than deleted; the whole cache drops
//! with its owning session. Values are inserted whole behind an `Arc`, so a
//! concurrent reader never observes a partially built index.

use crate::models::AttributionIndex;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Thread-safe cache of parsed attribution indexes.
#[derive(Default)]
pub struct AttributionCache {
    entries: DashMap<(PathBuf, String), Arc<AttributionIndex>>,
}

impl AttributionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the index cached for `path` at `head`.
    pub fn get(&self, path: &Path, head: &str) -> Option<Arc<AttributionIndex>> {
        self.entries
            .get(&(path.to_path_buf(), head.to_string()))
            .map(|entry| entry.clone())
    }

    /// Store a freshly parsed index and hand back the shared handle.
    pub fn put(&self, path: &Path, head: &str, index: AttributionIndex) -> Arc<AttributionIndex> {
        let index = Arc::new(index);
        self.entries
            .insert((path.to_path_buf(), head.to_string()), index.clone());
        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
