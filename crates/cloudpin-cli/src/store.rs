//! Store selection by URL scheme.

use std::path::Path;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use cloudpin_core::{
    FetchOutcome, FetchRequest, Query, QueryCursor, QueryEvent, RecordStore, Result, StoreUrl,
};
use cloudpin_file::FileStore;
use cloudpin_http::HttpStore;

/// Either backend, chosen from the store URL.
#[derive(Debug)]
pub enum AnyStore {
    File(FileStore),
    Http(HttpStore),
}

impl AnyStore {
    /// Open a file store for `file://` URLs, an HTTP store otherwise.
    pub fn open(url: StoreUrl, asset_dir: &Path) -> Result<Self> {
        if url.is_local() {
            Ok(AnyStore::File(FileStore::open(url)?))
        } else {
            Ok(AnyStore::Http(HttpStore::new(url, asset_dir)?))
        }
    }
}

#[async_trait]
impl RecordStore for AnyStore {
    type Query = Pin<Box<dyn Stream<Item = Result<QueryEvent>> + Send>>;
    type Fetch = Pin<Box<dyn Stream<Item = FetchOutcome> + Send>>;

    fn url(&self) -> &StoreUrl {
        match self {
            AnyStore::File(store) => store.url(),
            AnyStore::Http(store) => store.url(),
        }
    }

    fn query_from(&self, query: Query, cursor: Option<QueryCursor>) -> Self::Query {
        match self {
            AnyStore::File(store) => Box::pin(store.query_from(query, cursor)),
            AnyStore::Http(store) => Box::pin(store.query_from(query, cursor)),
        }
    }

    fn fetch(&self, request: FetchRequest) -> Self::Fetch {
        match self {
            AnyStore::File(store) => Box::pin(store.fetch(request)),
            AnyStore::Http(store) => Box::pin(store.fetch(request)),
        }
    }
}
