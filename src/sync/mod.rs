//! Record synchronizer.
//!
//! Two independent pollers, one per collection. Each poller owns the only
//! sender of its slot (a `watch` channel holding an `Arc` snapshot), so a
//! publication is a single pointer replacement and readers never see a
//! partially updated collection. The two slots refresh on their own cadence
//! and are not consistent with each other.
//!
//! A failed fetch is logged and the previous snapshot stays published.

use crate::Result;
use crate::backend::Backend;
use crate::record::{MessageSnapshot, NodeSnapshot};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Refresh periods for the two collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub messages: Duration,
    pub nodes: Duration,
}

/// Read side of the two snapshot slots.
#[derive(Debug, Clone)]
pub struct SnapshotFeeds {
    pub messages: watch::Receiver<MessageSnapshot>,
    pub nodes: watch::Receiver<NodeSnapshot>,
}

/// Handle to the running pollers. Dropping it leaves them running until all
/// receivers are gone; `shutdown` stops them immediately.
pub struct Synchronizer {
    pollers: Vec<JoinHandle<()>>,
}

impl Synchronizer {
    /// Spawn both pollers on the current tokio runtime. The first fetch of
    /// each collection starts immediately.
    pub fn start<B: Backend>(backend: Arc<B>, cadence: Cadence) -> (Self, SnapshotFeeds) {
        let (messages_tx, messages_rx) = watch::channel(MessageSnapshot::default());
        let (nodes_tx, nodes_rx) = watch::channel(NodeSnapshot::default());

        let for_messages = Arc::clone(&backend);
        let messages = spawn_poller("messages", cadence.messages, messages_tx, move || {
            for_messages.fetch_messages()
        });
        let nodes = spawn_poller("nodes", cadence.nodes, nodes_tx, move || backend.fetch_nodes());

        tracing::info!(
            messages_every_ms = cadence.messages.as_millis() as u64,
            nodes_every_ms = cadence.nodes.as_millis() as u64,
            "synchronizer started"
        );

        (
            Self {
                pollers: vec![messages, nodes],
            },
            SnapshotFeeds {
                messages: messages_rx,
                nodes: nodes_rx,
            },
        )
    }

    pub fn shutdown(self) {
        for poller in self.pollers {
            poller.abort();
        }
        tracing::info!("synchronizer stopped");
    }
}

fn spawn_poller<T, F>(
    collection: &'static str,
    period: Duration,
    slot: watch::Sender<Arc<Vec<T>>>,
    fetch: F,
) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
    F: Fn() -> Result<Vec<T>> + Send + Sync + 'static,
{
    let fetch = Arc::new(fetch);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = slot.closed() => break,
                _ = ticker.tick() => {}
            }

            let fetch = Arc::clone(&fetch);
            match tokio::task::spawn_blocking(move || (*fetch)()).await {
                Ok(Ok(records)) => {
                    tracing::debug!(collection, records = records.len(), "snapshot published");
                    // Whole-collection replacement; never merged with the old one.
                    slot.send_replace(Arc::new(records));
                }
                Ok(Err(err)) => {
                    let detail = format!("{err:#}");
                    tracing::warn!(collection, error = %detail, "refresh failed, keeping previous snapshot");
                }
                Err(err) => {
                    tracing::warn!(collection, error = %err, "refresh task failed, keeping previous snapshot");
                }
            }
        }

        tracing::debug!(collection, "poller exiting, no readers left");
    })
}
