//! Asset download into a local directory.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use uuid::Uuid;

use cloudpin_core::{Asset, RecordId, Result};

use crate::client::HttpClient;

/// Downloads asset fields into `<dir>/<record id>/<field>`.
///
/// A download always replaces the previous file for the same record and
/// field. Files are never cleaned up by this type.
#[derive(Debug, Clone)]
pub struct AssetDownloader {
    client: HttpClient,
    dir: PathBuf,
}

impl AssetDownloader {
    pub fn new(client: HttpClient, dir: impl AsRef<Path>) -> Self {
        Self {
            client,
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Returns the download directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the local path for an asset field.
    pub fn path_for(&self, id: &RecordId, field: &str) -> PathBuf {
        self.dir.join(id.as_str()).join(field)
    }

    /// Download an asset and return its local reference.
    #[instrument(skip(self, url))]
    pub async fn download(
        &self,
        id: &RecordId,
        field: &str,
        url: &str,
        size: Option<u64>,
    ) -> Result<Asset> {
        let bytes = self.client.download(url).await?;
        let path = self.path_for(id, field);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Unique per download so concurrent writers never share a temp file.
        let temp_path = path.with_extension(format!("{}.part", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, &bytes).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        debug!(path = %path.display(), len = bytes.len(), "Asset stored");

        Ok(Asset {
            location: path,
            size: size.or(Some(bytes.len() as u64)),
        })
    }
}
