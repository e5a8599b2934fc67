//! Handle for per-record thumbnail resolution.

use std::path::PathBuf;

use tokio::sync::{mpsc, oneshot};

use cloudpin_core::RecordId;

use crate::engine::Command;
use crate::error::SyncError;
use crate::thumbnail::{Thumbnail, ThumbnailSink};

/// Resolves thumbnails through the engine's cache, fetching on a miss.
///
/// Cheap to clone. All clones share one cache.
#[derive(Clone)]
pub struct ThumbnailResolver {
    commands: mpsc::UnboundedSender<Command>,
}

impl ThumbnailResolver {
    pub(crate) fn new(commands: mpsc::UnboundedSender<Command>) -> Self {
        Self { commands }
    }

    /// Show a thumbnail for `id` on `sink`.
    ///
    /// The sink sees [`Thumbnail::Placeholder`] before this returns. It later
    /// sees the image bytes if they can be resolved; otherwise nothing more
    /// and the placeholder stays. Failures are logged, never returned. A
    /// failed fetch is not remembered, so calling again retries.
    pub fn resolve(&self, id: RecordId, sink: impl ThumbnailSink) {
        sink.show(Thumbnail::Placeholder);
        let sink: Box<dyn ThumbnailSink> = Box::new(sink);
        // A stopped engine leaves the placeholder in place.
        let _ = self.commands.send(Command::Resolve { id, sink });
    }

    /// Resolve `id` and wait for the final thumbnail.
    ///
    /// Returns the image bytes, or the placeholder when resolution fails.
    pub async fn thumbnail(&self, id: RecordId) -> Thumbnail {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.resolve(id, move |thumbnail| {
            let _ = tx.send(thumbnail);
        });

        let mut latest = Thumbnail::Placeholder;
        while let Some(thumbnail) = rx.recv().await {
            latest = thumbnail;
            if !latest.is_placeholder() {
                break;
            }
        }
        latest
    }

    /// The cached asset location for `id`, if one has been resolved.
    pub async fn cached_location(&self, id: RecordId) -> Result<Option<PathBuf>, SyncError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::CachedLocation { id, reply })
            .map_err(|_| SyncError::Closed)?;
        response.await.map_err(|_| SyncError::Closed)
    }
}
