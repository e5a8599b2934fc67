//! Error types for record store operations.
//!
//! A single error type with explicit variants for transport, protocol,
//! missing-record and input validation failures.

use std::fmt;
use thiserror::Error;

/// The unified error type for record store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network or filesystem transport errors.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The store answered, but with an error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The requested record does not exist.
    #[error("record not found: {id}")]
    NotFound { id: String },

    /// Input validation errors (invalid identifier, kind, URL).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection to the store failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// Local I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if the store turned the request away for load reasons.
    pub fn is_throttled(&self) -> bool {
        matches!(self, Error::Protocol(p) if p.is_throttled())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Transport(TransportError::Io(err))
    }
}

/// An error reported by the store itself.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code, or a status-like code for local stores.
    pub status: u16,
    /// Server error code (if present).
    pub code: Option<String>,
    /// Human readable reason from the server.
    pub reason: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref reason) = self.reason {
            write!(f, ": {}", reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, code: Option<String>, reason: Option<String>) -> Self {
        Self {
            status,
            code,
            reason,
        }
    }

    /// Check if the server reported the request as throttled.
    pub fn is_throttled(&self) -> bool {
        self.status == 429 || self.code.as_deref() == Some("THROTTLED")
    }
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid record identifier.
    #[error("invalid record id '{value}': {reason}")]
    RecordId { value: String, reason: String },

    /// Invalid record kind.
    #[error("invalid record kind '{value}': {reason}")]
    RecordKind { value: String, reason: String },

    /// Invalid store URL.
    #[error("invalid store URL '{value}': {reason}")]
    StoreUrl { value: String, reason: String },

    /// Malformed stored or transmitted record.
    #[error("malformed record '{id}': {reason}")]
    Record { id: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
