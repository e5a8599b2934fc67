//! Validated identifier types.
//!
//! These types enforce their format at construction time, so a value that
//! exists is always safe to use as a path segment or query parameter.

mod record_id;
mod record_kind;
mod store_url;

pub use record_id::RecordId;
pub use record_kind::RecordKind;
pub use store_url::StoreUrl;
