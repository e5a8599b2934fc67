//! cloudpin-http - HTTP-backed record store.
//!
//! Talks a small JSON protocol (`records/query`, `records/lookup`) and
//! downloads asset fields into a local directory so that every [`Asset`]
//! handed out points at a readable local file.
//!
//! [`Asset`]: cloudpin_core::Asset

mod assets;
mod client;
mod store;
mod stream;
mod wire;

pub use assets::AssetDownloader;
pub use client::HttpClient;
pub use store::HttpStore;
pub use stream::{HttpFetch, HttpQuery};
