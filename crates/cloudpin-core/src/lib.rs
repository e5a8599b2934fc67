//! cloudpin-core - Core record, query and store types.
//!
//! This crate defines the vocabulary shared by every record store backend
//! and by the list synchronizer: validated identifiers, the record and query
//! model, and the [`RecordStore`] trait that backends implement.

pub mod error;
pub mod record;
pub mod traits;
pub mod types;

pub use error::Error;
pub use record::{
    Asset, FetchOutcome, FetchRequest, Predicate, Priority, Query, QueryCursor, QueryEvent,
    Record, SortDescriptor, SortKey,
};
pub use traits::{FetchStream, QueryStream, RecordStore};
pub use types::{RecordId, RecordKind, StoreUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
