//! Result streams for the file-backed store.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;

use cloudpin_core::{FetchOutcome, QueryEvent, Result};

/// Query result stream for the file-backed store.
pub struct FileQuery {
    inner: Pin<Box<dyn Stream<Item = Result<QueryEvent>> + Send>>,
}

impl FileQuery {
    pub(crate) fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<QueryEvent>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for FileQuery {
    type Item = Result<QueryEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Fetch completion stream for the file-backed store.
pub struct FileFetch {
    inner: Pin<Box<dyn Stream<Item = FetchOutcome> + Send>>,
}

impl FileFetch {
    pub(crate) fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = FetchOutcome> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for FileFetch {
    type Item = FetchOutcome;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
