//! Error types for the synchronizer and resolver.

use std::path::PathBuf;

use thiserror::Error;

use cloudpin_core::RecordId;

/// Errors produced by the sync engine.
///
/// `RemoteQuery` is returned to refresh callers. `AssetFetch` and `AssetRead`
/// never reach callers: they are logged and the thumbnail stays a
/// placeholder.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The list query failed on the store or in transit.
    #[error("record query failed: {0}")]
    RemoteQuery(#[source] cloudpin_core::Error),

    /// Fetching a record's image asset failed.
    #[error("asset fetch for {id} failed: {source}")]
    AssetFetch {
        id: RecordId,
        #[source]
        source: cloudpin_core::Error,
    },

    /// A resolved asset location could not be read.
    #[error("asset for {id} unreadable at {}: {source}", location.display())]
    AssetRead {
        id: RecordId,
        location: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A newer refresh started before this one completed.
    #[error("refresh {generation} superseded by a newer refresh")]
    Superseded { generation: u64 },

    /// The configuration cannot produce a valid query.
    #[error("invalid configuration: {0}")]
    Config(#[source] cloudpin_core::Error),

    /// The engine task has stopped.
    #[error("sync engine stopped")]
    Closed,
}
