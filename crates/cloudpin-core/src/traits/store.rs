//! Record store trait.

use std::future::poll_fn;
use std::pin::pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::{Error, InvalidInputError};
use crate::record::{FetchRequest, Query, QueryCursor, Record};
use crate::types::StoreUrl;
use crate::Result;

use super::{FetchStream, QueryStream};

/// A read-only remote record store.
///
/// Operations return streams that do no work until polled. Dropping a
/// stream abandons the operation.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Query result stream type for this store.
    type Query: QueryStream + 'static;
    /// Fetch result stream type for this store.
    type Fetch: FetchStream + 'static;

    /// Returns the URL of this store.
    fn url(&self) -> &StoreUrl;

    /// Run a query from the beginning.
    fn query(&self, query: Query) -> Self::Query {
        self.query_from(query, None)
    }

    /// Run a query, resuming after `cursor` when given.
    fn query_from(&self, query: Query, cursor: Option<QueryCursor>) -> Self::Query;

    /// Look up records by identifier.
    fn fetch(&self, request: FetchRequest) -> Self::Fetch;

    /// Look up a single record, waiting for its completion.
    async fn fetch_record(&self, request: FetchRequest) -> Result<Record> {
        let id = match request.ids.as_slice() {
            [id] => id.clone(),
            ids => {
                return Err(InvalidInputError::Other {
                    message: format!("fetch_record expects one id, got {}", ids.len()),
                }
                .into());
            }
        };

        let mut stream = pin!(self.fetch(request));
        while let Some(outcome) = poll_fn(|cx| stream.as_mut().poll_next(cx)).await {
            if outcome.id == id {
                return outcome.result;
            }
        }

        Err(Error::NotFound {
            id: id.to_string(),
        })
    }
}
