//! cloudpin-sync - Record list synchronization and thumbnail cache.
//!
//! A [`SyncEngine`] owns the record list and the thumbnail cache on a single
//! task. Callers talk to it through two cheap handles:
//!
//! - [`RecordListSynchronizer`] refreshes the list with one sorted, limited,
//!   projected query and exposes the list as it fills.
//! - [`ThumbnailResolver`] answers per-record thumbnail requests from the
//!   cache, or fetches the record's image asset in the background.
//!
//! # Example
//!
//! ```no_run
//! use cloudpin_core::{RecordStore, StoreUrl};
//! use cloudpin_file::FileStore;
//! use cloudpin_sync::{SyncConfig, SyncEngine, Thumbnail, ThumbnailCache};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileStore::open(StoreUrl::new("file:///tmp/records")?)?;
//! let (list, thumbnails) = SyncEngine::spawn(store, SyncConfig::default(), ThumbnailCache::new())?;
//!
//! for summary in list.refresh().await?.iter() {
//!     match thumbnails.thumbnail(summary.id.clone()).await {
//!         Thumbnail::Image(bytes) => println!("{}: {} bytes", summary.name, bytes.len()),
//!         Thumbnail::Placeholder => println!("{}: placeholder", summary.name),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod engine;
mod error;
mod resolver;
mod summary;
mod synchronizer;
mod thumbnail;

pub use cache::ThumbnailCache;
pub use config::{MAX_RESULTS, SummaryFields, SyncConfig};
pub use engine::SyncEngine;
pub use error::SyncError;
pub use resolver::ThumbnailResolver;
pub use summary::{RecordList, RecordSummary};
pub use synchronizer::{ListState, Phase, RecordListSynchronizer};
pub use thumbnail::{Thumbnail, ThumbnailSink};
