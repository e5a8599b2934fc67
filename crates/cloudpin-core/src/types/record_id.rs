//! Record identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Maximum length of a record identifier.
const MAX_LEN: usize = 255;

/// A validated, stable record identifier.
///
/// Identifiers are opaque to the client; they are also used as file names
/// by the file-backed store, which is why the character set is restricted.
///
/// # Example
///
/// ```
/// use cloudpin_core::RecordId;
///
/// let id = RecordId::new("0F2C7A1E-cafe").unwrap();
/// assert_eq!(id.as_str(), "0F2C7A1E-cafe");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Create a new record id, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, too long, `.`/`..`, or
    /// contains characters outside `[A-Za-z0-9._~-]`.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::RecordId {
                value: s.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if s.is_empty() {
            return Err(invalid("cannot be empty"));
        }

        if s.len() > MAX_LEN {
            return Err(invalid("exceeds maximum length of 255 characters"));
        }

        if s == "." || s == ".." {
            return Err(invalid("cannot be '.' or '..'"));
        }

        if let Some(c) = s
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '-' | '_' | '~'))
        {
            return Err(InvalidInputError::RecordId {
                value: s.to_string(),
                reason: format!("contains invalid character '{}'", c),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
