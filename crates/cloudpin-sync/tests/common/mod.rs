//! Scripted record store for engine tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures_util::Stream;
use serde_json::json;
use tokio::sync::{Semaphore, mpsc};

use cloudpin_core::error::TransportError;
use cloudpin_core::{
    Asset, Error, FetchOutcome, FetchRequest, Query, QueryCursor, QueryEvent, Record, RecordId,
    RecordKind, RecordStore, Result, StoreUrl,
};

pub type Events = mpsc::UnboundedSender<Result<QueryEvent>>;

#[derive(Default)]
struct Inner {
    scripts: Mutex<VecDeque<mpsc::UnboundedReceiver<Result<QueryEvent>>>>,
    queries: Mutex<Vec<Query>>,
    fetches: Mutex<Vec<FetchRequest>>,
    fetch_count: AtomicUsize,
    records: Mutex<HashMap<RecordId, Record>>,
    fail_once: Mutex<HashSet<RecordId>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    panic_next_query: AtomicBool,
}

/// A record store whose query results are pushed by the test and whose
/// fetches are answered from an in-memory table.
#[derive(Clone)]
pub struct MockStore {
    url: StoreUrl,
    inner: Arc<Inner>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            url: StoreUrl::new("https://records.test/db").unwrap(),
            inner: Arc::default(),
        }
    }

    /// Queue results for the next query. Events pushed on the returned
    /// sender are streamed in order; dropping it ends the stream.
    pub fn script(&self) -> Events {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.scripts.lock().unwrap().push_back(rx);
        tx
    }

    /// Queue a query that yields `records` and completes.
    pub fn script_complete(&self, records: Vec<Record>) {
        let events = self.script();
        for record in records {
            events.send(Ok(QueryEvent::Record(record))).unwrap();
        }
        events.send(Ok(QueryEvent::Complete { cursor: None })).unwrap();
    }

    /// Make the next query stream panic after its scripted events run out.
    pub fn panic_next_query(&self) {
        self.inner.panic_next_query.store(true, Ordering::SeqCst);
    }

    pub fn add_record(&self, record: Record) {
        self.inner
            .records
            .lock()
            .unwrap()
            .insert(record.id.clone(), record);
    }

    /// Make the next fetch of `id` fail.
    pub fn fail_next_fetch(&self, id: &str) {
        self.inner.fail_once.lock().unwrap().insert(rid(id));
    }

    /// Hold every fetch until a permit is added to the returned semaphore.
    pub fn gate_fetches(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.inner.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn queries(&self) -> Vec<Query> {
        self.inner.queries.lock().unwrap().clone()
    }

    pub fn fetch_requests(&self) -> Vec<FetchRequest> {
        self.inner.fetches.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.inner.fetch_count.load(Ordering::SeqCst)
    }

    /// Wait until `count` fetches have been issued.
    pub async fn wait_for_fetches(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.fetch_count() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("fetches never issued");
    }
}

#[async_trait]
impl RecordStore for MockStore {
    type Query = Pin<Box<dyn Stream<Item = Result<QueryEvent>> + Send>>;
    type Fetch = Pin<Box<dyn Stream<Item = FetchOutcome> + Send>>;

    fn url(&self) -> &StoreUrl {
        &self.url
    }

    fn query_from(&self, query: Query, _cursor: Option<QueryCursor>) -> Self::Query {
        self.inner.queries.lock().unwrap().push(query);
        let script = self.inner.scripts.lock().unwrap().pop_front();
        let panics = self.inner.panic_next_query.swap(false, Ordering::SeqCst);

        Box::pin(async_stream::stream! {
            let Some(mut events) = script else {
                yield Err(Error::from(TransportError::Connection {
                    message: "no scripted query".to_string(),
                }));
                return;
            };
            while let Some(event) = events.recv().await {
                yield event;
            }
            if panics {
                panic!("query stream failed");
            }
        })
    }

    fn fetch(&self, request: FetchRequest) -> Self::Fetch {
        self.inner.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.inner.fetches.lock().unwrap().push(request.clone());
        let inner = Arc::clone(&self.inner);

        Box::pin(async_stream::stream! {
            let gate = inner.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.acquire().await.unwrap().forget();
            }

            for id in request.ids {
                let failed = inner.fail_once.lock().unwrap().remove(&id);
                let result = if failed {
                    Err(Error::from(TransportError::Timeout))
                } else {
                    let record = inner.records.lock().unwrap().get(&id).cloned();
                    match (record, &request.desired_keys) {
                        (Some(record), Some(keys)) => Ok(record.project(keys)),
                        (Some(record), None) => Ok(record),
                        (None, _) => Err(Error::NotFound { id: id.to_string() }),
                    }
                };
                yield FetchOutcome { id, result };
            }
        })
    }
}

pub fn rid(s: &str) -> RecordId {
    RecordId::new(s).unwrap()
}

/// A restaurant created `secs` seconds after the epoch.
pub fn restaurant(id: &str, secs: i64) -> Record {
    Record {
        id: rid(id),
        kind: RecordKind::new("Restaurant").unwrap(),
        created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        fields: json!({
            "name": format!("Restaurant {id}"),
            "category": "Cafe",
            "location": "Hong Kong",
        })
        .as_object()
        .cloned()
        .unwrap(),
        assets: Default::default(),
    }
}

/// A restaurant whose `image` asset is a file under `dir` holding `bytes`.
pub fn restaurant_with_image(id: &str, dir: &Path, bytes: &[u8]) -> Record {
    let location = dir.join(format!("{id}.jpg"));
    std::fs::write(&location, bytes).unwrap();

    let mut record = restaurant(id, 0);
    record.assets.insert("image".to_string(), Asset::new(location));
    record
}
