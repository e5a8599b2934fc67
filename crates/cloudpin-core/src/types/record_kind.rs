//! Record kind type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated record kind: the schema tag a query filters on.
///
/// Kinds start with an ASCII letter followed by ASCII alphanumerics or
/// underscores, at most 64 characters.
///
/// # Example
///
/// ```
/// use cloudpin_core::RecordKind;
///
/// let kind = RecordKind::new("Restaurant").unwrap();
/// assert_eq!(kind.as_str(), "Restaurant");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordKind(String);

impl RecordKind {
    /// Create a new record kind, validating the format.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the kind string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let reason = match s.chars().next() {
            None => Some("cannot be empty".to_string()),
            Some(first) if !first.is_ascii_alphabetic() => {
                Some("must start with a letter".to_string())
            }
            Some(_) if s.len() > 64 => Some("exceeds maximum length of 64 characters".to_string()),
            Some(_) => s
                .chars()
                .find(|c| !c.is_ascii_alphanumeric() && *c != '_')
                .map(|c| format!("contains invalid character '{}'", c)),
        };

        match reason {
            Some(reason) => Err(InvalidInputError::RecordKind {
                value: s.to_string(),
                reason,
            }
            .into()),
            None => Ok(()),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RecordKind {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RecordKind> for String {
    fn from(kind: RecordKind) -> Self {
        kind.0
    }
}
