//! Query description types.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Record;
use crate::types::RecordKind;

/// Scheduling priority of a store operation relative to other operations
/// issued by the same client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    VeryLow,
    Low,
    #[default]
    Normal,
    High,
    VeryHigh,
}

/// Filter applied to records of the queried kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Predicate {
    /// Every record matches.
    #[default]
    All,
    /// Records whose field `key` equals `value`.
    Equals { key: String, value: Value },
}

impl Predicate {
    /// Returns true if the record satisfies the predicate.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Equals { key, value } => record.fields.get(key) == Some(value),
        }
    }
}

/// What a sort descriptor orders by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// The server-assigned creation time.
    CreationDate,
    /// An inline field.
    Field(String),
}

/// One level of a query's sort order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub key: SortKey,
    pub ascending: bool,
}

impl SortDescriptor {
    /// Newest records first.
    pub fn newest_first() -> Self {
        Self {
            key: SortKey::CreationDate,
            ascending: false,
        }
    }

    /// Order two records by this descriptor.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = match &self.key {
            SortKey::CreationDate => a.created_at.cmp(&b.created_at),
            SortKey::Field(key) => compare_values(a.fields.get(key), b.fields.get(key)),
        };

        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

// Missing values sort first. Values of different JSON types order by type
// rank; arrays and objects compare equal among themselves.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => type_rank(a).cmp(&type_rank(b)).then_with(|| match (a, b) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => {
                let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                a.total_cmp(&b)
            }
            (Value::String(a), Value::String(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) | Value::Object(_) => 4,
    }
}

/// Opaque marker for resuming a query where a previous page stopped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryCursor(String);

impl QueryCursor {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sorted, limited, field-projected scan of one record kind.
///
/// # Example
///
/// ```
/// use cloudpin_core::{Priority, Query, RecordKind, SortDescriptor};
///
/// let query = Query::new(RecordKind::new("Restaurant").unwrap())
///     .sort_by(SortDescriptor::newest_first())
///     .desired_keys(["name", "type", "location"])
///     .limit(50)
///     .priority(Priority::VeryHigh);
/// assert_eq!(query.limit, Some(50));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub kind: RecordKind,
    #[serde(default)]
    pub predicate: Predicate,
    #[serde(default)]
    pub sort: Vec<SortDescriptor>,
    /// Keys to return. `None` returns every field.
    #[serde(default)]
    pub desired_keys: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub priority: Priority,
}

impl Query {
    /// Match every record of `kind`, unsorted and unlimited.
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            predicate: Predicate::All,
            sort: Vec::new(),
            desired_keys: None,
            limit: None,
            priority: Priority::Normal,
        }
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// Append a sort level; earlier levels take precedence.
    pub fn sort_by(mut self, descriptor: SortDescriptor) -> Self {
        self.sort.push(descriptor);
        self
    }

    pub fn desired_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.desired_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Order two records by every sort level in turn.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.sort
            .iter()
            .map(|descriptor| descriptor.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// One item of a query's result stream.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    /// A matching record, in the query's sort order.
    Record(Record),

    /// The query is exhausted. `cursor` is set when more matches exist
    /// beyond the limit.
    Complete { cursor: Option<QueryCursor> },
}
