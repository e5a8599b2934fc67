//! Session-scoped thumbnail location cache.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use cloudpin_core::RecordId;

/// Maps record ids to the local location of their image asset.
///
/// Stores locations, not decoded bytes. Entries are never evicted or
/// replaced; the first location written for an id is kept for the life of
/// the cache. Create one per session and hand it to
/// [`SyncEngine::spawn`](crate::SyncEngine::spawn).
#[derive(Debug, Clone, Default)]
pub struct ThumbnailCache {
    entries: HashMap<RecordId, PathBuf>,
}

impl ThumbnailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Path> {
        self.entries.get(id).map(PathBuf::as_path)
    }

    /// Record a location for `id` unless one is already present. Returns the
    /// location now held for `id`.
    pub fn insert(&mut self, id: RecordId, location: PathBuf) -> &Path {
        match self.entries.entry(id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(location),
        }
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
