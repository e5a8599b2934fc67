//! Record summaries and the ordered list built from them.

use std::ops::Deref;

use serde::Serialize;

use cloudpin_core::{Record, RecordId};

use crate::config::SummaryFields;

/// The lightweight view of a record shown in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub id: RecordId,
    pub name: String,
    pub category: String,
    pub location: String,
}

impl RecordSummary {
    /// Build a summary from a projected record. Missing or non-string
    /// fields read as empty.
    pub fn from_record(record: &Record, fields: &SummaryFields) -> Self {
        let text = |key: &str| record.field_str(key).unwrap_or_default().to_string();

        Self {
            id: record.id.clone(),
            name: text(&fields.name),
            category: text(&fields.category),
            location: text(&fields.location),
        }
    }
}

/// Summaries in server sort order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecordList(Vec<RecordSummary>);

impl RecordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, summary: RecordSummary) {
        self.0.push(summary);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RecordSummary> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecordSummary> {
        self.0.iter()
    }

    /// Identifiers in list order.
    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.0.iter().map(|summary| &summary.id)
    }

    pub fn into_vec(self) -> Vec<RecordSummary> {
        self.0
    }
}

impl Deref for RecordList {
    type Target = [RecordSummary];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<RecordSummary>> for RecordList {
    fn from(summaries: Vec<RecordSummary>) -> Self {
        Self(summaries)
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = &'a RecordSummary;
    type IntoIter = std::slice::Iter<'a, RecordSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
