//! Synchronizer configuration.

use serde::{Deserialize, Serialize};

use cloudpin_core::{Priority, Query, RecordKind, SortDescriptor};

use crate::error::SyncError;

/// Hard cap on the number of records a refresh keeps.
pub const MAX_RESULTS: u32 = 50;

/// Field keys a summary is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SummaryFields {
    pub name: String,
    pub category: String,
    pub location: String,
}

impl Default for SummaryFields {
    fn default() -> Self {
        Self {
            name: "name".to_string(),
            category: "category".to_string(),
            location: "location".to_string(),
        }
    }
}

impl SummaryFields {
    /// The projection requested from the store.
    pub fn keys(&self) -> [&str; 3] {
        [self.name.as_str(), self.category.as_str(), self.location.as_str()]
    }
}

/// What the list shows and how thumbnails are found.
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```
/// use cloudpin_sync::SyncConfig;
///
/// let config: SyncConfig =
///     serde_json::from_str(r#"{"thumbnailField": "photo", "fields": {"category": "type"}}"#).unwrap();
/// assert_eq!(config.fields.category, "type");
/// assert_eq!(config.thumbnail_field, "photo");
/// assert_eq!(config.fields.name, "name");
/// assert_eq!(config.record_kind, "Restaurant");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// Record kind to list.
    pub record_kind: String,
    /// Summary field keys.
    pub fields: SummaryFields,
    /// Asset field holding the thumbnail image.
    pub thumbnail_field: String,
    /// Records per refresh, clamped to `1..=MAX_RESULTS`.
    pub limit: u32,
    /// Priority of list queries and thumbnail fetches.
    pub priority: Priority,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            record_kind: "Restaurant".to_string(),
            fields: SummaryFields::default(),
            thumbnail_field: "image".to_string(),
            limit: MAX_RESULTS,
            priority: Priority::VeryHigh,
        }
    }
}

impl SyncConfig {
    /// The effective result limit.
    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, MAX_RESULTS)
    }

    /// Build the list query: newest first, projected to the summary fields.
    pub fn query(&self) -> Result<Query, SyncError> {
        let kind = RecordKind::new(&self.record_kind).map_err(SyncError::Config)?;

        Ok(Query::new(kind)
            .sort_by(SortDescriptor::newest_first())
            .desired_keys(self.fields.keys())
            .limit(self.limit())
            .priority(self.priority))
    }
}
