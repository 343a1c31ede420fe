// Broadcast hub: fans each snapshot out to every connected viewer.
// One bounded queue per viewer, drained by that viewer's own WS task; a full
// queue means the viewer is dropped, never that the sampler waits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::models::MetricsSnapshot;

pub type ViewerId = u64;

/// Receiving half of one registration. The transport task drains `rx`; once
/// it yields `None` the hub has dropped this viewer (or the process is
/// shutting down) and the transport should be closed.
pub struct Viewer {
    pub id: ViewerId,
    pub rx: mpsc::Receiver<Arc<MetricsSnapshot>>,
}

/// Registry of live viewers. A viewer is Registered while its sender is in
/// the map; removal flips it to Draining (queued snapshots still flow out)
/// and the drain task observing the closed queue finishes the Close.
pub struct Hub {
    viewers: Mutex<HashMap<ViewerId, mpsc::Sender<Arc<MetricsSnapshot>>>>,
    next_id: AtomicU64,
    queue_capacity: usize,
}

impl Hub {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            viewers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            queue_capacity,
        }
    }

    /// Adds a viewer. Only snapshots broadcast after this call are delivered;
    /// there is no backfill.
    pub fn register(&self) -> Viewer {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        self.lock_viewers().insert(id, tx);
        tracing::debug!(viewer_id = id, "viewer registered");
        Viewer { id, rx }
    }

    /// Removes a viewer. Idempotent; safe concurrently with broadcast.
    pub fn unregister(&self, id: ViewerId) -> bool {
        let removed = self.lock_viewers().remove(&id).is_some();
        if removed {
            tracing::debug!(viewer_id = id, "viewer unregistered");
        }
        removed
    }

    pub fn viewer_count(&self) -> usize {
        self.lock_viewers().len()
    }

    /// Enqueues the snapshot on every registered viewer's queue. Never
    /// blocks: a viewer whose queue is full (or whose drain task is gone) is
    /// dropped on the spot, and the rest are unaffected. Returns how many
    /// viewers accepted the snapshot.
    pub fn broadcast(&self, snapshot: Arc<MetricsSnapshot>) -> usize {
        // Membership snapshot under the lock; the sends happen outside it so
        // register/unregister are never held up by the fan-out.
        let targets: Vec<(ViewerId, mpsc::Sender<Arc<MetricsSnapshot>>)> = {
            let viewers = self.lock_viewers();
            viewers.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };

        let mut delivered = 0;
        for (id, tx) in targets {
            match tx.try_send(snapshot.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(viewer_id = id, "viewer queue full, dropping viewer");
                    self.unregister(id);
                }
                Err(TrySendError::Closed(_)) => {
                    // Drain task already went away; clean up the registry.
                    self.unregister(id);
                }
            }
        }
        delivered
    }

    fn lock_viewers(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<ViewerId, mpsc::Sender<Arc<MetricsSnapshot>>>> {
        self.viewers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
