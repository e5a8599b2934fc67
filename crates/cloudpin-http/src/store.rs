//! HTTP-backed record store.

use std::path::Path;

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Map;
use tracing::{debug, instrument, warn};

use cloudpin_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use cloudpin_core::{
    FetchOutcome, FetchRequest, Query, QueryCursor, QueryEvent, Record, RecordId, RecordKind,
    RecordStore, Result, StoreUrl,
};

use crate::assets::AssetDownloader;
use crate::client::HttpClient;
use crate::stream::{HttpFetch, HttpQuery};
use crate::wire::*;

/// A record store reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: HttpClient,
    assets: AssetDownloader,
}

impl HttpStore {
    /// Create a store client; asset fields are downloaded below `asset_dir`.
    pub fn new(store: StoreUrl, asset_dir: impl AsRef<Path>) -> Result<Self> {
        let client = HttpClient::new(store)?;
        let assets = AssetDownloader::new(client.clone(), asset_dir);
        Ok(Self { client, assets })
    }

    /// Returns the asset downloader.
    pub fn assets(&self) -> &AssetDownloader {
        &self.assets
    }

    #[instrument(skip(self, query), fields(kind = %query.kind))]
    async fn query_page(
        &self,
        query: &Query,
        cursor: Option<&QueryCursor>,
    ) -> Result<QueryResponse> {
        debug!("Querying records via HTTP");

        let request = QueryRequest {
            query: QueryBody {
                record_type: query.kind.as_str(),
                filter_by: Filter::from_predicate(&query.predicate),
                sort_by: query.sort.iter().map(Sort::from).collect(),
            },
            desired_keys: query.desired_keys.as_deref(),
            results_limit: query.limit,
            continuation_marker: cursor.map(QueryCursor::as_str),
        };

        self.client.post(QUERY, &request, query.priority).await
    }

    #[instrument(skip(self, request), fields(count = request.ids.len()))]
    async fn lookup(&self, request: &FetchRequest) -> Result<LookupResponse> {
        debug!("Looking up records via HTTP");

        let body = LookupRequest {
            records: request
                .ids
                .iter()
                .map(|id| RecordRef {
                    record_name: id.as_str(),
                })
                .collect(),
            desired_keys: request.desired_keys.as_deref(),
        };

        self.client.post(LOOKUP, &body, request.priority).await
    }

    /// Convert a wire record, downloading its asset fields.
    async fn to_record(&self, wire: WireRecord) -> Result<Record> {
        if let Some(code) = wire.server_error_code {
            if code == "NOT_FOUND" {
                return Err(Error::NotFound {
                    id: wire.record_name,
                });
            }
            // Per-record errors arrive inside a successful envelope.
            return Err(ProtocolError::new(200, Some(code), wire.reason).into());
        }

        let malformed = |reason: &str| -> Error {
            InvalidInputError::Record {
                id: wire.record_name.clone(),
                reason: reason.to_string(),
            }
            .into()
        };

        let id = RecordId::new(&wire.record_name)?;
        let kind = RecordKind::new(
            wire.record_type
                .clone()
                .ok_or_else(|| malformed("missing recordType"))?,
        )?;
        let created_at = wire
            .created
            .as_ref()
            .and_then(|c| DateTime::from_timestamp_millis(c.timestamp))
            .ok_or_else(|| malformed("missing or invalid creation timestamp"))?;

        let mut fields = Map::new();
        let mut assets = std::collections::BTreeMap::new();

        for (key, value) in wire.fields {
            let field: WireField = serde_json::from_value(value)
                .map_err(|e| malformed(&format!("field '{}': {}", key, e)))?;

            if field.kind.as_deref() != Some(ASSET_TYPE) {
                fields.insert(key, field.value);
                continue;
            }

            if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                warn!(record = %id, field = %key, "Skipping asset with unsafe field name");
                continue;
            }

            let asset: WireAsset = serde_json::from_value(field.value)
                .map_err(|e| malformed(&format!("asset '{}': {}", key, e)))?;
            let asset = self
                .assets
                .download(&id, &key, &asset.download_url, asset.size)
                .await?;
            assets.insert(key, asset);
        }

        Ok(Record {
            id,
            kind,
            created_at,
            fields,
            assets,
        })
    }
}

/// Re-create a failed lookup's error for one of its requested ids.
fn duplicate(err: &Error, id: &RecordId) -> Error {
    match err {
        Error::Protocol(p) => p.clone().into(),
        Error::NotFound { .. } => Error::NotFound { id: id.to_string() },
        Error::InvalidInput(e) => e.clone().into(),
        Error::Transport(e) => match e {
            TransportError::Timeout => TransportError::Timeout,
            TransportError::Connection { message } => TransportError::Connection {
                message: message.clone(),
            },
            TransportError::Http { message } => TransportError::Http {
                message: message.clone(),
            },
            TransportError::Io(e) => {
                TransportError::Io(std::io::Error::new(e.kind(), e.to_string()))
            }
        }
        .into(),
    }
}

#[async_trait]
impl RecordStore for HttpStore {
    type Query = HttpQuery;
    type Fetch = HttpFetch;

    fn url(&self) -> &StoreUrl {
        self.client.store()
    }

    fn query_from(&self, query: Query, cursor: Option<QueryCursor>) -> Self::Query {
        let store = self.clone();

        HttpQuery::new(async_stream::stream! {
            match store.query_page(&query, cursor.as_ref()).await {
                Err(e) => yield Err(e),
                Ok(response) => {
                    let mut failed = false;
                    for wire in response.records {
                        match store.to_record(wire).await {
                            Ok(record) => yield Ok(QueryEvent::Record(record)),
                            Err(e) => {
                                failed = true;
                                yield Err(e);
                                break;
                            }
                        }
                    }
                    if !failed {
                        let cursor = response.continuation_marker.map(QueryCursor::new);
                        yield Ok(QueryEvent::Complete { cursor });
                    }
                }
            }
        })
    }

    fn fetch(&self, request: FetchRequest) -> Self::Fetch {
        let store = self.clone();

        HttpFetch::new(async_stream::stream! {
            match store.lookup(&request).await {
                Err(e) => {
                    for id in request.ids {
                        let result = Err(duplicate(&e, &id));
                        yield FetchOutcome { id, result };
                    }
                }
                Ok(response) => {
                    let mut remaining = response.records;
                    for id in request.ids {
                        let position = remaining.iter().position(|r| r.record_name == id.as_str());
                        let result = match position {
                            Some(index) => store.to_record(remaining.swap_remove(index)).await,
                            None => Err(Error::NotFound { id: id.to_string() }),
                        };
                        yield FetchOutcome { id, result };
                    }
                }
            }
        })
    }
}
