//! Filesystem-backed record store.
//!
//! ## Directory Structure
//!
//! ```text
//! $ROOT/
//! ├── records/
//! │   └── <Kind>/
//! │       └── <id>.json
//! └── assets/
//!     └── ...            # referenced from records, relative to $ROOT
//! ```
//!
//! A record file holds the creation time, the inline fields and the asset
//! references; the id and kind come from the file path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use cloudpin_core::error::{Error, InvalidInputError};
use cloudpin_core::{
    Asset, FetchOutcome, FetchRequest, Query, QueryCursor, QueryEvent, Record, RecordId,
    RecordKind, RecordStore, Result, StoreUrl,
};

use crate::stream::{FileFetch, FileQuery};

/// On-disk form of a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// Inline field values.
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Asset fields, by field name.
    #[serde(default)]
    pub assets: BTreeMap<String, StoredAsset>,
}

/// On-disk form of an asset reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAsset {
    /// Path of the asset bytes, relative to the store root.
    pub path: PathBuf,
    /// Size in bytes, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// A record store kept in a local directory.
///
/// Queries and fetches read the directory on every call, so external edits
/// are visible immediately. Priorities are accepted and ignored.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    url: StoreUrl,
}

impl FileStore {
    /// Open the store rooted at `root`.
    pub fn new(root: impl AsRef<Path>, url: StoreUrl) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            url,
        }
    }

    /// Open the store a `file://` URL points at.
    pub fn open(url: StoreUrl) -> Result<Self> {
        let root = url.to_file_path().ok_or_else(|| InvalidInputError::StoreUrl {
            value: url.to_string(),
            reason: "not a file:// URL".to_string(),
        })?;
        Ok(Self::new(root, url))
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the records directory.
    fn records_dir(&self) -> PathBuf {
        self.root.join("records")
    }

    /// Get the directory holding all records of a kind.
    pub fn kind_dir(&self, kind: &RecordKind) -> PathBuf {
        self.records_dir().join(kind.as_str())
    }

    /// Get the path of a specific record file.
    pub fn record_path(&self, kind: &RecordKind, id: &RecordId) -> PathBuf {
        self.kind_dir(kind).join(format!("{}.json", id))
    }

    fn to_record(&self, id: RecordId, kind: RecordKind, stored: StoredRecord) -> Record {
        let assets = stored
            .assets
            .into_iter()
            .map(|(key, asset)| {
                let location = self.root.join(&asset.path);
                (
                    key,
                    Asset {
                        location,
                        size: asset.size,
                    },
                )
            })
            .collect();

        Record {
            id,
            kind,
            created_at: stored.created_at,
            fields: stored.fields,
            assets,
        }
    }

    async fn read_record(&self, path: &Path, kind: &RecordKind) -> Result<Record> {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| InvalidInputError::Other {
                message: format!("unreadable record file name: {}", path.display()),
            })?;
        let id = RecordId::new(id)?;

        let content = tokio::fs::read_to_string(path).await?;
        let stored: StoredRecord =
            serde_json::from_str(&content).map_err(|e| InvalidInputError::Record {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        Ok(self.to_record(id, kind.clone(), stored))
    }

    /// Load every readable record of a kind. Malformed files are skipped.
    async fn load_kind(&self, kind: &RecordKind) -> Result<Vec<Record>> {
        let dir = self.kind_dir(kind);
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }

            match self.read_record(&path, kind).await {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable record"),
            }
        }

        Ok(records)
    }

    /// Run a query against the directory, returning one page and the cursor
    /// for the next page if there is one.
    #[instrument(skip(self, query), fields(kind = %query.kind))]
    pub(crate) async fn run_query(
        &self,
        query: &Query,
        cursor: Option<&QueryCursor>,
    ) -> Result<(Vec<Record>, Option<QueryCursor>)> {
        let offset = match cursor {
            Some(cursor) => cursor.as_str().parse::<usize>().map_err(|_| {
                Error::InvalidInput(InvalidInputError::Other {
                    message: format!("invalid query cursor '{}'", cursor),
                })
            })?,
            None => 0,
        };

        let mut matching: Vec<Record> = self
            .load_kind(&query.kind)
            .await?
            .into_iter()
            .filter(|record| query.predicate.matches(record))
            .collect();

        matching.sort_by(|a, b| query.compare(a, b).then_with(|| a.id.cmp(&b.id)));

        let total = matching.len();
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let end = offset.saturating_add(limit).min(total);

        let page: Vec<Record> = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|record| match &query.desired_keys {
                Some(keys) => record.project(keys),
                None => record,
            })
            .collect();

        let next = (end < total).then(|| QueryCursor::new(end.to_string()));

        debug!(total, returned = page.len(), "Query evaluated");

        Ok((page, next))
    }

    /// Find a record of any kind by id.
    #[instrument(skip(self))]
    pub(crate) async fn find_record(&self, id: &RecordId) -> Result<Record> {
        let records_dir = self.records_dir();
        if tokio::fs::try_exists(&records_dir).await? {
            let mut kinds = tokio::fs::read_dir(&records_dir).await?;
            while let Some(entry) = kinds.next_entry().await? {
                let Some(kind) = entry.file_name().to_str().and_then(|k| RecordKind::new(k).ok())
                else {
                    continue;
                };

                let path = self.record_path(&kind, id);
                if tokio::fs::try_exists(&path).await? {
                    return self.read_record(&path, &kind).await;
                }
            }
        }

        Err(Error::NotFound { id: id.to_string() })
    }
}

#[async_trait]
impl RecordStore for FileStore {
    type Query = FileQuery;
    type Fetch = FileFetch;

    fn url(&self) -> &StoreUrl {
        &self.url
    }

    fn query_from(&self, query: Query, cursor: Option<QueryCursor>) -> Self::Query {
        let store = self.clone();

        FileQuery::new(async_stream::stream! {
            match store.run_query(&query, cursor.as_ref()).await {
                Ok((records, cursor)) => {
                    for record in records {
                        yield Ok(QueryEvent::Record(record));
                    }
                    yield Ok(QueryEvent::Complete { cursor });
                }
                Err(e) => yield Err(e),
            }
        })
    }

    fn fetch(&self, request: FetchRequest) -> Self::Fetch {
        let store = self.clone();

        FileFetch::new(async_stream::stream! {
            for id in request.ids {
                let result = store.find_record(&id).await.map(|record| {
                    match &request.desired_keys {
                        Some(keys) => record.project(keys),
                        None => record,
                    }
                });
                yield FetchOutcome { id, result };
            }
        })
    }
}
