//! Mock store tests for the HTTP record store.
//!
//! These tests use wiremock to simulate a record server and check the
//! client's request shapes, streaming and error handling.

use cloudpin_core::error::Error;
use cloudpin_core::{
    FetchOutcome, FetchRequest, Priority, Query, QueryCursor, QueryEvent, RecordId, RecordKind,
    RecordStore, SortDescriptor, StoreUrl,
};
use cloudpin_http::HttpStore;
use futures_util::StreamExt;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a store from a mock server.
fn mock_store(server: &MockServer, assets: &TempDir) -> HttpStore {
    let url = StoreUrl::new(format!("http://127.0.0.1:{}/db", server.address().port())).unwrap();
    HttpStore::new(url, assets.path()).unwrap()
}

fn restaurant_query() -> Query {
    Query::new(RecordKind::new("Restaurant").unwrap())
        .sort_by(SortDescriptor::newest_first())
        .desired_keys(["name", "type", "location"])
        .limit(50)
        .priority(Priority::VeryHigh)
}

fn wire_record(name: &str, created_ms: i64, title: &str) -> serde_json::Value {
    json!({
        "recordName": name,
        "recordType": "Restaurant",
        "created": {"timestamp": created_ms},
        "fields": {
            "name": {"value": title, "type": "STRING"},
            "type": {"value": "Cafe", "type": "STRING"},
            "location": {"value": "Hong Kong", "type": "STRING"}
        }
    })
}

// ============================================================================
// Query Tests
// ============================================================================

#[tokio::test]
async fn test_query_streams_records_in_server_order() {
    let server = MockServer::start().await;
    let assets = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/db/records/query"))
        .and(header("x-request-priority", "veryHigh"))
        .and(body_partial_json(json!({
            "query": {
                "recordType": "Restaurant",
                "sortBy": [{"fieldName": "___createTime", "ascending": false}]
            },
            "desiredKeys": ["name", "type", "location"],
            "resultsLimit": 50
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                wire_record("newest", 3_000, "Cafe Deadend"),
                wire_record("middle", 2_000, "Homei"),
                wire_record("oldest", 1_000, "Teakha")
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = mock_store(&server, &assets);
    let events: Vec<_> = store.query(restaurant_query()).collect().await;

    assert_eq!(events.len(), 4);
    let names: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Ok(QueryEvent::Record(r)) => r.field_str("name").map(str::to_string),
            _ => None,
        })
        .collect();
    assert_eq!(names, ["Cafe Deadend", "Homei", "Teakha"]);
    assert!(matches!(
        events.last(),
        Some(Ok(QueryEvent::Complete { cursor: None }))
    ));
}

#[tokio::test]
async fn test_query_passes_continuation_marker() {
    let server = MockServer::start().await;
    let assets = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/db/records/query"))
        .and(body_partial_json(json!({"continuationMarker": "page-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [wire_record("r9", 9_000, "Upstate")],
            "continuationMarker": "page-3"
        })))
        .mount(&server)
        .await;

    let store = mock_store(&server, &assets);
    let events: Vec<_> = store
        .query_from(restaurant_query(), Some(QueryCursor::new("page-2")))
        .collect()
        .await;

    assert!(matches!(
        events.last(),
        Some(Ok(QueryEvent::Complete { cursor: Some(c) })) if c.as_str() == "page-3"
    ));
}

#[tokio::test]
async fn test_query_server_error_is_protocol_error() {
    let server = MockServer::start().await;
    let assets = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/db/records/query"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "serverErrorCode": "SERVICE_UNAVAILABLE",
            "reason": "maintenance"
        })))
        .mount(&server)
        .await;

    let store = mock_store(&server, &assets);
    let events: Vec<_> = store.query(restaurant_query()).collect().await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        Err(Error::Protocol(p)) => {
            assert_eq!(p.status, 503);
            assert_eq!(p.code.as_deref(), Some("SERVICE_UNAVAILABLE"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_query_malformed_record_stops_stream_after_good_ones() {
    let server = MockServer::start().await;
    let assets = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/db/records/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                wire_record("good", 2_000, "Good"),
                {"recordName": "bad", "recordType": "Restaurant", "fields": {}}
            ]
        })))
        .mount(&server)
        .await;

    let store = mock_store(&server, &assets);
    let events: Vec<_> = store.query(restaurant_query()).collect().await;

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], Ok(QueryEvent::Record(_))));
    assert!(matches!(events[1], Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn test_non_json_error_response() {
    let server = MockServer::start().await;
    let assets = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/db/records/query"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("Internal Server Error")
                .insert_header("content-type", "text/plain"),
        )
        .mount(&server)
        .await;

    let store = mock_store(&server, &assets);
    let events: Vec<_> = store.query(restaurant_query()).collect().await;

    let err = events[0].as_ref().unwrap_err().to_string();
    assert!(err.contains("500"));
}

// ============================================================================
// Lookup Tests
// ============================================================================

#[tokio::test]
async fn test_lookup_downloads_asset_to_local_file() {
    let server = MockServer::start().await;
    let assets = TempDir::new().unwrap();
    let download_url = format!("http://127.0.0.1:{}/assets/r1.jpg", server.address().port());

    Mock::given(method("POST"))
        .and(path("/db/records/lookup"))
        .and(body_partial_json(json!({
            "records": [{"recordName": "r1"}],
            "desiredKeys": ["image"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{
                "recordName": "r1",
                "recordType": "Restaurant",
                "created": {"timestamp": 1_000},
                "fields": {
                    "image": {
                        "value": {"downloadURL": download_url, "size": 10},
                        "type": "ASSETID"
                    }
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/assets/r1.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let store = mock_store(&server, &assets);
    let request = FetchRequest::single(RecordId::new("r1").unwrap())
        .desired_keys(["image"])
        .priority(Priority::VeryHigh);
    let record = store.fetch_record(request).await.unwrap();

    let asset = record.asset("image").unwrap();
    assert!(asset.location().starts_with(assets.path()));
    assert_eq!(std::fs::read(asset.location()).unwrap(), b"jpeg-bytes");
    assert_eq!(asset.size, Some(10));
}

#[tokio::test]
async fn test_lookup_reports_per_record_errors() {
    let server = MockServer::start().await;
    let assets = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/db/records/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                wire_record("found", 1_000, "Found"),
                {"recordName": "gone", "serverErrorCode": "NOT_FOUND", "reason": "deleted"},
                {"recordName": "locked", "serverErrorCode": "ACCESS_DENIED"}
            ]
        })))
        .mount(&server)
        .await;

    let store = mock_store(&server, &assets);
    let ids = ["found", "gone", "locked", "unlisted"]
        .into_iter()
        .map(|id| RecordId::new(id).unwrap())
        .collect();
    let outcomes: Vec<FetchOutcome> = store.fetch(FetchRequest::new(ids)).collect().await;

    assert_eq!(outcomes.len(), 4);
    assert!(outcomes[0].result.is_ok());
    assert!(matches!(outcomes[1].result, Err(Error::NotFound { .. })));
    assert!(matches!(outcomes[2].result, Err(Error::Protocol(_))));
    assert!(matches!(outcomes[3].result, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn test_lookup_failure_reaches_every_id() {
    let server = MockServer::start().await;
    let assets = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/db/records/lookup"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "serverErrorCode": "THROTTLED"
        })))
        .mount(&server)
        .await;

    let store = mock_store(&server, &assets);
    let ids = vec![RecordId::new("a").unwrap(), RecordId::new("b").unwrap()];
    let outcomes: Vec<FetchOutcome> = store.fetch(FetchRequest::new(ids)).collect().await;

    assert_eq!(outcomes.len(), 2);
    for outcome in outcomes {
        match outcome.result {
            Err(Error::Protocol(p)) => assert!(p.is_throttled()),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
