//! Result stream traits.

use futures_core::Stream;

use crate::Result;
use crate::record::{FetchOutcome, QueryEvent};

/// Stream of query results. Ends after `QueryEvent::Complete` or the first
/// error.
pub trait QueryStream: Stream<Item = Result<QueryEvent>> + Send {}

impl<T> QueryStream for T where T: Stream<Item = Result<QueryEvent>> + Send {}

/// Stream of per-record fetch completions, one per requested id.
pub trait FetchStream: Stream<Item = FetchOutcome> + Send {}

impl<T> FetchStream for T where T: Stream<Item = FetchOutcome> + Send {}
