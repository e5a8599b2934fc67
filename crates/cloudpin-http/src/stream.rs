//! Result streams for the HTTP-backed store.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;

use cloudpin_core::{FetchOutcome, QueryEvent, Result};

/// Query result stream for the HTTP-backed store.
pub struct HttpQuery {
    inner: Pin<Box<dyn Stream<Item = Result<QueryEvent>> + Send>>,
}

impl HttpQuery {
    pub(crate) fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<QueryEvent>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for HttpQuery {
    type Item = Result<QueryEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Fetch completion stream for the HTTP-backed store.
pub struct HttpFetch {
    inner: Pin<Box<dyn Stream<Item = FetchOutcome> + Send>>,
}

impl HttpFetch {
    pub(crate) fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = FetchOutcome> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for HttpFetch {
    type Item = FetchOutcome;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
