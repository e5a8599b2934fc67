//! cloudpin-file - Filesystem-backed record store.

mod store;
mod stream;

pub use store::{FileStore, StoredAsset, StoredRecord};
pub use stream::{FileFetch, FileQuery};
