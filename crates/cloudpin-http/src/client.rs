//! HTTP client for the record store protocol.

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use cloudpin_core::error::{Error, ProtocolError, TransportError};
use cloudpin_core::{Priority, Result, StoreUrl};

use crate::wire::{ErrorResponse, PRIORITY_HEADER};

/// Map a reqwest error onto the transport taxonomy.
pub(crate) fn transport(err: reqwest::Error) -> Error {
    let err = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}

fn priority_value(priority: Priority) -> HeaderValue {
    HeaderValue::from_static(match priority {
        Priority::VeryLow => "veryLow",
        Priority::Low => "low",
        Priority::Normal => "normal",
        Priority::High => "high",
        Priority::VeryHigh => "veryHigh",
    })
}

/// HTTP client bound to one store.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    store: StoreUrl,
}

impl HttpClient {
    /// Create a new client for the given store.
    pub fn new(store: StoreUrl) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cloudpin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(transport)?;

        Ok(Self { client, store })
    }

    /// Returns the store URL this client is configured for.
    pub fn store(&self) -> &StoreUrl {
        &self.store
    }

    /// POST a JSON body to an endpoint and decode the JSON answer.
    #[instrument(skip(self, body), fields(store = %self.store))]
    pub async fn post<B, R>(&self, path: &str, body: &B, priority: Priority) -> Result<R>
    where
        B: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        let url = self.store.endpoint(path);
        debug!(%url, ?priority, "POST");
        trace!(?body, "request body");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(PRIORITY_HEADER, priority_value(priority))
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        self.handle_response(response).await
    }

    /// GET raw bytes from an absolute URL.
    #[instrument(skip(self))]
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading");

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Protocol(self.parse_error_response(response).await));
        }

        let bytes = response.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }

    /// Handle a response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(&self, response: reqwest::Response) -> Result<R> {
        let status = response.status();
        trace!(status = %status, "response");

        if status.is_success() {
            response.json::<R>().await.map_err(transport)
        } else {
            Err(Error::Protocol(self.parse_error_response(response).await))
        }
    }

    /// Parse an error body, tolerating non-JSON bodies.
    async fn parse_error_response(&self, response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(body) => ProtocolError::new(status, body.server_error_code, body.reason),
            Err(_) => ProtocolError::new(status, None, None),
        }
    }
}
