//! Store URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated record store URL.
///
/// Network stores use HTTPS (or HTTP for localhost); local stores use a
/// `file://` URL pointing at the store's root directory.
///
/// # Example
///
/// ```
/// use cloudpin_core::StoreUrl;
///
/// let store = StoreUrl::new("https://records.example.com/db/public").unwrap();
/// assert_eq!(store.endpoint("records/query"),
///            "https://records.example.com/db/public/records/query");
///
/// let local = StoreUrl::new("file:///tmp/records").unwrap();
/// assert!(local.is_local());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StoreUrl(Url);

impl StoreUrl {
    /// Create a new store URL from a string, validating the format.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::StoreUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Build a store URL from a local directory path.
    pub fn from_directory(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let url = Url::from_directory_path(path).map_err(|_| InvalidInputError::StoreUrl {
            value: path.display().to_string(),
            reason: "path must be absolute".to_string(),
        })?;
        Ok(Self(url))
    }

    /// Returns the URL of an endpoint below this store.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Returns the URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns the URL scheme.
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Returns true if this is a filesystem store (`file://`).
    pub fn is_local(&self) -> bool {
        self.0.scheme() == "file"
    }

    /// Returns true if this is a network store (`http://` or `https://`).
    pub fn is_network(&self) -> bool {
        matches!(self.0.scheme(), "http" | "https")
    }

    /// Returns the filesystem path for `file://` URLs.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.is_local() {
            self.0.to_file_path().ok()
        } else {
            None
        }
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::StoreUrl {
                value: original.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }

        let scheme = url.scheme();

        if scheme == "file" {
            if url.path().is_empty() {
                return Err(invalid("file:// URL must have a path"));
            }
            return Ok(());
        }

        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(invalid("must use HTTPS (HTTP allowed only for localhost)"));
        }

        if url.host_str().is_none() {
            return Err(invalid("must have a host"));
        }

        Ok(())
    }
}

impl fmt::Display for StoreUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StoreUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for StoreUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for StoreUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        StoreUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for StoreUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
