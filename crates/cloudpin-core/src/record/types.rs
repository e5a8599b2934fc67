//! Record types.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{RecordId, RecordKind};

/// A reference to out-of-line binary data held by a record.
///
/// The location is local: stores that keep assets remotely download them
/// before handing out an `Asset`, so reading `location` never needs the
/// network. The file may still disappear later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Where the asset bytes can be read from.
    pub location: PathBuf,

    /// Size in bytes, when the store reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Asset {
    /// Create an asset reference for a local file.
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            size: None,
        }
    }

    /// Returns the asset location.
    pub fn location(&self) -> &Path {
        &self.location
    }
}

/// A record returned by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable identifier of the record.
    pub id: RecordId,

    /// The record kind (schema tag).
    pub kind: RecordKind,

    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,

    /// Inline field values. Only projected keys are present.
    #[serde(default)]
    pub fields: Map<String, Value>,

    /// Asset fields. Only projected keys are present.
    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,
}

impl Record {
    /// Returns a string field, if present and a string.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Returns an asset field, if present.
    pub fn asset(&self, key: &str) -> Option<&Asset> {
        self.assets.get(key)
    }

    /// Keep only the given keys, across both inline and asset fields.
    pub fn project(mut self, keys: &[String]) -> Self {
        self.fields.retain(|k, _| keys.iter().any(|key| key == k));
        self.assets.retain(|k, _| keys.iter().any(|key| key == k));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Record {
        let mut assets = BTreeMap::new();
        assets.insert("image".to_string(), Asset::new("/tmp/a.jpg"));
        Record {
            id: RecordId::new("r1").unwrap(),
            kind: RecordKind::new("Restaurant").unwrap(),
            created_at: Utc::now(),
            fields: json!({"name": "Cafe Deadend", "type": "Coffee", "stars": 4})
                .as_object()
                .cloned()
                .unwrap(),
            assets,
        }
    }

    #[test]
    fn field_str_ignores_non_strings() {
        let record = sample();
        assert_eq!(record.field_str("name"), Some("Cafe Deadend"));
        assert_eq!(record.field_str("stars"), None);
        assert_eq!(record.field_str("missing"), None);
    }

    #[test]
    fn projection_covers_fields_and_assets() {
        let record = sample().project(&["name".to_string()]);
        assert_eq!(record.fields.len(), 1);
        assert!(record.assets.is_empty());

        let record = sample().project(&["image".to_string()]);
        assert!(record.fields.is_empty());
        assert!(record.asset("image").is_some());
    }
}
