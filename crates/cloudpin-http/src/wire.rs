//! Wire protocol definitions and request/response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use cloudpin_core::{Predicate, SortDescriptor, SortKey};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Sorted, limited scan of one record type.
pub const QUERY: &str = "records/query";

/// Point lookup of records by name.
pub const LOOKUP: &str = "records/lookup";

/// Header carrying the request priority.
pub const PRIORITY_HEADER: &str = "x-request-priority";

/// Field name the server uses for the creation timestamp.
pub const CREATED_FIELD: &str = "___createTime";

/// Field type tag of asset fields.
pub const ASSET_TYPE: &str = "ASSETID";

// ============================================================================
// Request Types
// ============================================================================

/// Request body for records/query.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest<'a> {
    pub query: QueryBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_keys: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation_marker: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryBody<'a> {
    pub record_type: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter_by: Vec<Filter<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort_by: Vec<Sort<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter<'a> {
    pub field_name: &'a str,
    pub comparator: &'static str,
    pub field_value: FieldValue<'a>,
}

#[derive(Debug, Serialize)]
pub struct FieldValue<'a> {
    pub value: &'a Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort<'a> {
    pub field_name: &'a str,
    pub ascending: bool,
}

impl<'a> Filter<'a> {
    pub fn from_predicate(predicate: &'a Predicate) -> Vec<Self> {
        match predicate {
            Predicate::All => Vec::new(),
            Predicate::Equals { key, value } => vec![Filter {
                field_name: key,
                comparator: "EQUALS",
                field_value: FieldValue { value },
            }],
        }
    }
}

impl<'a> From<&'a SortDescriptor> for Sort<'a> {
    fn from(descriptor: &'a SortDescriptor) -> Self {
        let field_name = match &descriptor.key {
            SortKey::CreationDate => CREATED_FIELD,
            SortKey::Field(name) => name.as_str(),
        };
        Sort {
            field_name,
            ascending: descriptor.ascending,
        }
    }
}

/// Request body for records/lookup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest<'a> {
    pub records: Vec<RecordRef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_keys: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRef<'a> {
    pub record_name: &'a str,
}

// ============================================================================
// Response Types
// ============================================================================

/// Response from records/query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub records: Vec<WireRecord>,
    #[serde(default)]
    pub continuation_marker: Option<String>,
}

/// Response from records/lookup.
#[derive(Debug, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub records: Vec<WireRecord>,
}

/// A record, or a per-record error, as sent by the server.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecord {
    pub record_name: String,
    #[serde(default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub created: Option<Timestamp>,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub server_error_code: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Timestamp {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// A typed field value.
#[derive(Debug, Deserialize)]
pub struct WireField {
    pub value: Value,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Value of an asset field.
#[derive(Debug, Deserialize)]
pub struct WireAsset {
    #[serde(rename = "downloadURL")]
    pub download_url: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Error body for non-2xx responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub server_error_code: Option<String>,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudpin_core::{Query, RecordKind};
    use serde_json::json;

    #[test]
    fn query_request_shape() {
        let query = Query::new(RecordKind::new("Restaurant").unwrap())
            .sort_by(SortDescriptor::newest_first())
            .desired_keys(["name"])
            .limit(50);

        let request = QueryRequest {
            query: QueryBody {
                record_type: query.kind.as_str(),
                filter_by: Filter::from_predicate(&query.predicate),
                sort_by: query.sort.iter().map(Sort::from).collect(),
            },
            desired_keys: query.desired_keys.as_deref(),
            results_limit: query.limit,
            continuation_marker: None,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "query": {
                    "recordType": "Restaurant",
                    "sortBy": [{"fieldName": "___createTime", "ascending": false}]
                },
                "desiredKeys": ["name"],
                "resultsLimit": 50
            })
        );
    }

    #[test]
    fn lookup_error_entry_parses() {
        let response: LookupResponse = serde_json::from_value(json!({
            "records": [{"recordName": "r1", "serverErrorCode": "NOT_FOUND", "reason": "gone"}]
        }))
        .unwrap();
        assert_eq!(response.records[0].server_error_code.as_deref(), Some("NOT_FOUND"));
    }
}
