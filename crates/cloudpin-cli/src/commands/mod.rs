//! Command implementations.

pub mod browse;
pub mod list;
pub mod thumbnail;

use anyhow::{Context, Result};

use cloudpin_sync::{RecordListSynchronizer, SyncEngine, ThumbnailCache, ThumbnailResolver};

use crate::settings::Settings;
use crate::store::AnyStore;

/// Open the configured store and start an engine with an empty cache.
fn start(settings: Settings) -> Result<(RecordListSynchronizer, ThumbnailResolver)> {
    let store = AnyStore::open(settings.store, &settings.asset_dir)
        .context("Failed to open record store")?;
    SyncEngine::spawn(store, settings.sync, ThumbnailCache::new())
        .context("Failed to start sync engine")
}
