//! The single-consumer task that owns the list and the thumbnail cache.
//!
//! Handles send [`Command`]s over an unbounded channel. Store I/O runs on
//! spawned tasks which report back over the same channel, tagged with the
//! refresh generation (queries) or record id (fetches). Only the engine task
//! mutates the list, the cache or the in-flight table, and only it calls
//! thumbnail sinks with image bytes.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io;
use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use cloudpin_core::error::TransportError;
use cloudpin_core::{FetchRequest, Priority, Query, QueryEvent, Record, RecordId, RecordStore};

use crate::cache::ThumbnailCache;
use crate::config::{SummaryFields, SyncConfig};
use crate::error::SyncError;
use crate::resolver::ThumbnailResolver;
use crate::summary::{RecordList, RecordSummary};
use crate::synchronizer::{ListState, Phase, RecordListSynchronizer};
use crate::thumbnail::{Thumbnail, ThumbnailSink};

pub(crate) type RefreshReply = oneshot::Sender<Result<RecordList, SyncError>>;

pub(crate) enum Command {
    Refresh {
        reply: RefreshReply,
    },
    Query {
        generation: u64,
        event: cloudpin_core::Result<QueryEvent>,
    },
    QueryEnded {
        generation: u64,
    },
    Resolve {
        id: RecordId,
        sink: Box<dyn ThumbnailSink>,
    },
    Fetched {
        id: RecordId,
        result: cloudpin_core::Result<Record>,
    },
    Loaded {
        id: RecordId,
        location: PathBuf,
        sinks: Vec<Box<dyn ThumbnailSink>>,
        result: io::Result<Vec<u8>>,
    },
    CachedLocation {
        id: RecordId,
        reply: oneshot::Sender<Option<PathBuf>>,
    },
}

struct PendingRefresh {
    generation: u64,
    reply: RefreshReply,
    task: JoinHandle<()>,
}

/// Owner of the record list and the thumbnail cache.
///
/// Created with [`SyncEngine::spawn`]; the engine itself is never handed
/// out. It runs until every handle and every background task is gone.
pub struct SyncEngine<S> {
    store: Arc<S>,
    query: Query,
    thumbnail_field: String,
    priority: Priority,
    fields: SummaryFields,
    limit: usize,
    cache: ThumbnailCache,
    state: watch::Sender<ListState>,
    generation: u64,
    pending: Option<PendingRefresh>,
    in_flight: HashMap<RecordId, Vec<Box<dyn ThumbnailSink>>>,
    commands: mpsc::WeakUnboundedSender<Command>,
}

impl<S> SyncEngine<S>
where
    S: RecordStore + 'static,
{
    /// Start the engine on the current tokio runtime.
    ///
    /// Fails if `config` cannot produce a valid query. Panics if called
    /// outside a tokio runtime.
    pub fn spawn(
        store: S,
        config: SyncConfig,
        cache: ThumbnailCache,
    ) -> Result<(RecordListSynchronizer, ThumbnailResolver), SyncError> {
        let query = config.query()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let (state, state_rx) = watch::channel(ListState::default());

        info!(store = %store.url(), kind = %query.kind, "Starting sync engine");

        let engine = Self {
            store: Arc::new(store),
            limit: config.limit() as usize,
            query,
            thumbnail_field: config.thumbnail_field,
            priority: config.priority,
            fields: config.fields,
            cache,
            state,
            generation: 0,
            pending: None,
            in_flight: HashMap::new(),
            commands: tx.downgrade(),
        };
        tokio::spawn(engine.run(rx));

        Ok((
            RecordListSynchronizer::new(tx.clone(), state_rx),
            ThumbnailResolver::new(tx),
        ))
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            self.handle(command);
        }
        debug!("Sync engine stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Refresh { reply } => self.refresh(reply),
            Command::Query { generation, event } => self.query_event(generation, event),
            Command::QueryEnded { generation } => {
                let error = TransportError::Connection {
                    message: "query stream ended before completion".to_string(),
                };
                self.query_event(generation, Err(error.into()));
            }
            Command::Resolve { id, sink } => self.resolve(id, sink),
            Command::Fetched { id, result } => self.fetched(id, result),
            Command::Loaded {
                id,
                location,
                sinks,
                result,
            } => deliver(id, location, sinks, result),
            Command::CachedLocation { id, reply } => {
                let _ = reply.send(self.cache.get(&id).map(PathBuf::from));
            }
        }
    }

    fn refresh(&mut self, reply: RefreshReply) {
        self.generation += 1;
        let generation = self.generation;

        if let Some(previous) = self.pending.take() {
            debug!(previous = previous.generation, generation, "Superseding refresh");
            previous.task.abort();
            let _ = previous.reply.send(Err(SyncError::Superseded {
                generation: previous.generation,
            }));
        }

        // Observers see an empty list until the first record arrives.
        self.state.send_modify(|state| {
            state.generation = generation;
            state.phase = Phase::Refreshing;
            state.records.clear();
        });

        let Some(tx) = self.commands.upgrade() else {
            let _ = reply.send(Err(SyncError::Closed));
            return;
        };

        debug!(generation, "Issuing list query");
        let task = tokio::spawn(run_query(
            Arc::clone(&self.store),
            self.query.clone(),
            generation,
            tx,
        ));

        self.pending = Some(PendingRefresh {
            generation,
            reply,
            task,
        });
    }

    fn query_event(&mut self, generation: u64, event: cloudpin_core::Result<QueryEvent>) {
        let current = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.generation == generation);
        if !current {
            debug!(generation, current = self.generation, "Discarding stale query result");
            return;
        }

        match event {
            Ok(QueryEvent::Record(record)) => {
                if self.state.borrow().records.len() >= self.limit {
                    warn!(id = %record.id, limit = self.limit, "Dropping record beyond result limit");
                    return;
                }
                let summary = RecordSummary::from_record(&record, &self.fields);
                self.state.send_modify(|state| state.records.push(summary));
            }
            Ok(QueryEvent::Complete { cursor }) => {
                let Some(pending) = self.pending.take() else {
                    return;
                };
                self.state.send_modify(|state| state.phase = Phase::Ready);
                let records = self.state.borrow().records.clone();
                info!(
                    generation,
                    count = records.len(),
                    more = cursor.is_some(),
                    "Refresh complete"
                );
                let _ = pending.reply.send(Ok(records));
            }
            Err(e) => {
                let Some(pending) = self.pending.take() else {
                    return;
                };
                self.state.send_modify(|state| state.phase = Phase::Failed);
                let kept = self.state.borrow().records.len();
                let throttled = e.is_throttled();
                let error = SyncError::RemoteQuery(e);
                warn!(generation, kept, throttled, error = %error, "Refresh failed");
                let _ = pending.reply.send(Err(error));
            }
        }
    }

    fn resolve(&mut self, id: RecordId, sink: Box<dyn ThumbnailSink>) {
        if let Some(location) = self.cache.get(&id) {
            debug!(%id, location = %location.display(), "Thumbnail cache hit");
            self.load(id.clone(), location.to_path_buf(), vec![sink]);
            return;
        }

        match self.in_flight.entry(id) {
            Entry::Occupied(mut waiting) => {
                debug!(id = %waiting.key(), "Joining in-flight thumbnail fetch");
                waiting.get_mut().push(sink);
            }
            Entry::Vacant(slot) => {
                let Some(tx) = self.commands.upgrade() else {
                    return;
                };
                let id = slot.key().clone();
                debug!(%id, "Fetching thumbnail asset");

                let request = FetchRequest::single(id.clone())
                    .desired_keys([self.thumbnail_field.as_str()])
                    .priority(self.priority);
                let store = Arc::clone(&self.store);
                tokio::spawn(async move {
                    let result = store.fetch_record(request).await;
                    let _ = tx.send(Command::Fetched { id, result });
                });

                slot.insert(vec![sink]);
            }
        }
    }

    fn fetched(&mut self, id: RecordId, result: cloudpin_core::Result<Record>) {
        let sinks = self.in_flight.remove(&id).unwrap_or_default();

        let record = match result {
            Ok(record) => record,
            Err(source) => {
                let throttled = source.is_throttled();
                let error = SyncError::AssetFetch { id, source };
                warn!(throttled, error = %error, "Thumbnail fetch failed");
                return;
            }
        };

        let Some(asset) = record.asset(&self.thumbnail_field) else {
            debug!(%id, field = %self.thumbnail_field, "Record has no thumbnail asset");
            return;
        };

        let location = self
            .cache
            .insert(id.clone(), asset.location.clone())
            .to_path_buf();
        debug!(%id, location = %location.display(), "Cached thumbnail location");
        self.load(id, location, sinks);
    }

    fn load(&self, id: RecordId, location: PathBuf, sinks: Vec<Box<dyn ThumbnailSink>>) {
        let Some(tx) = self.commands.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            let result = tokio::fs::read(&location).await;
            let _ = tx.send(Command::Loaded {
                id,
                location,
                sinks,
                result,
            });
        });
    }
}

async fn run_query<S>(
    store: Arc<S>,
    query: Query,
    generation: u64,
    tx: mpsc::UnboundedSender<Command>,
) where
    S: RecordStore + 'static,
{
    let mut guard = QueryGuard {
        generation,
        tx,
        finished: false,
    };
    let mut stream = pin!(store.query(query));

    while let Some(event) = stream.next().await {
        let last = !matches!(event, Ok(QueryEvent::Record(_)));
        if guard.tx.send(Command::Query { generation, event }).is_err() || last {
            guard.finished = true;
            return;
        }
    }
}

/// Reports `QueryEnded` unless the query task sent a terminal event.
///
/// Runs on early stream end, on a panic in the store's stream and on abort.
/// An aborted query is always stale, so the engine drops its report.
struct QueryGuard {
    generation: u64,
    tx: mpsc::UnboundedSender<Command>,
    finished: bool,
}

impl Drop for QueryGuard {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.tx.send(Command::QueryEnded {
                generation: self.generation,
            });
        }
    }
}

fn deliver(
    id: RecordId,
    location: PathBuf,
    sinks: Vec<Box<dyn ThumbnailSink>>,
    result: io::Result<Vec<u8>>,
) {
    match result {
        Ok(bytes) => {
            debug!(%id, bytes = bytes.len(), waiters = sinks.len(), "Delivering thumbnail");
            for sink in &sinks {
                sink.show(Thumbnail::Image(bytes.clone()));
            }
        }
        Err(source) => {
            // The entry stays cached; rows keep the placeholder.
            let error = SyncError::AssetRead {
                id,
                location,
                source,
            };
            warn!(error = %error, "Thumbnail unreadable");
        }
    }
}
