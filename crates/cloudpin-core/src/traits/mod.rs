//! Core traits for record store behavior.

mod store;
mod stream;

pub use store::RecordStore;
pub use stream::{FetchStream, QueryStream};
