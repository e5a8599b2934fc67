//! Record, query and fetch types.
//!
//! Stores produce [`Record`]s in answer to a [`Query`] (a sorted, limited,
//! projected scan of one record kind) or a [`FetchRequest`] (a point lookup
//! by identifier). Both are described here; the operations themselves are
//! methods on [`RecordStore`](crate::RecordStore).

mod fetch;
mod query;
mod types;

pub use fetch::{FetchOutcome, FetchRequest};
pub use query::{Predicate, Priority, Query, QueryCursor, QueryEvent, SortDescriptor, SortKey};
pub use types::{Asset, Record};
