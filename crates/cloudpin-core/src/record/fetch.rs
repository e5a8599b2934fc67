//! Point fetch types.

use serde::{Deserialize, Serialize};

use super::{Priority, Record};
use crate::Result;
use crate::types::RecordId;

/// A lookup of specific records by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub ids: Vec<RecordId>,
    /// Keys to return. `None` returns every field.
    #[serde(default)]
    pub desired_keys: Option<Vec<String>>,
    #[serde(default)]
    pub priority: Priority,
}

impl FetchRequest {
    pub fn new(ids: Vec<RecordId>) -> Self {
        Self {
            ids,
            desired_keys: None,
            priority: Priority::Normal,
        }
    }

    /// Fetch a single record.
    pub fn single(id: RecordId) -> Self {
        Self::new(vec![id])
    }

    pub fn desired_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.desired_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Completion of one record of a [`FetchRequest`].
#[derive(Debug)]
pub struct FetchOutcome {
    /// The requested identifier.
    pub id: RecordId,
    /// The record, or why it could not be fetched.
    pub result: Result<Record>,
}
