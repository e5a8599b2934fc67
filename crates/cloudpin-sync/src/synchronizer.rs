//! Handle for refreshing and observing the record list.

use tokio::sync::{mpsc, oneshot, watch};

use crate::engine::Command;
use crate::error::SyncError;
use crate::summary::RecordList;

/// Where the current refresh stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// No refresh has been requested yet.
    #[default]
    Idle,
    /// Records are arriving.
    Refreshing,
    /// The last refresh completed.
    Ready,
    /// The last refresh failed; `records` holds what arrived before the
    /// failure.
    Failed,
}

/// A snapshot of the list as the engine last published it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    /// Generation of the refresh that produced `records`. Zero before the
    /// first refresh.
    pub generation: u64,
    pub phase: Phase,
    pub records: RecordList,
}

/// Refreshes the record list and exposes it while it fills.
///
/// Cheap to clone. All clones talk to the same engine.
#[derive(Clone)]
pub struct RecordListSynchronizer {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ListState>,
}

impl RecordListSynchronizer {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<Command>,
        state: watch::Receiver<ListState>,
    ) -> Self {
        Self { commands, state }
    }

    /// Replace the list with a fresh query's results.
    ///
    /// The held list is cleared before the query is issued. Resolves with
    /// the complete list once the store reports the query exhausted. On
    /// failure the records that arrived so far stay in [`state`](Self::state)
    /// and the error is returned. A refresh started while this one is
    /// running supersedes it and this call returns
    /// [`SyncError::Superseded`].
    pub async fn refresh(&self) -> Result<RecordList, SyncError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Refresh { reply })
            .map_err(|_| SyncError::Closed)?;
        response.await.map_err(|_| SyncError::Closed)?
    }

    /// The latest published state.
    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// The records currently held, in server order.
    pub fn records(&self) -> RecordList {
        self.state.borrow().records.clone()
    }

    /// Watch every change to the list.
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.clone()
    }
}
