// Stale-while-revalidate cache for expensive external queries (docker ps,
// systemctl). Request handlers only ever read the last-good value; a
// background task recomputes it on a fixed interval, with at most one
// refresh in flight per entry.

use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Snapshot of an entry as served to consumers. `value` is `None` until the
/// first successful refresh; `error` carries the most recent refresh failure
/// so the API can surface staleness.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedValue<T> {
    pub value: Option<T>,
    /// Seconds since epoch of the last successful refresh.
    pub refreshed_at: Option<u64>,
    pub error: Option<String>,
}

struct EntryState<T> {
    value: Option<T>,
    refreshed_at: Option<u64>,
    last_error: Option<String>,
    in_flight: bool,
}

/// One named expensive query. Long-lived; the value, refresh timestamp and
/// in-flight flag all live under a single entry lock, so a successful
/// refresh updates value + timestamp atomically and a failed one leaves the
/// last-good value untouched.
pub struct CachedQuery<T> {
    name: &'static str,
    state: Mutex<EntryState<T>>,
}

impl<T: Clone> CachedQuery<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(EntryState {
                value: None,
                refreshed_at: None,
                last_error: None,
                in_flight: false,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the last-good value immediately. Never invokes the query, so
    /// read latency is independent of how slow the external call is.
    pub fn get(&self) -> CachedValue<T> {
        let state = self.lock_state();
        CachedValue {
            value: state.value.clone(),
            refreshed_at: state.refreshed_at,
            error: state.last_error.clone(),
        }
    }

    /// Runs the query and installs the result. Single-flight: if another
    /// refresh of this entry is already running, returns false without
    /// invoking the query.
    pub async fn refresh<F, Fut>(&self, query: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        if !self.begin_refresh() {
            tracing::debug!(cache = self.name, "refresh already in flight, skipping");
            return false;
        }
        let result = query().await;
        self.finish_refresh(result);
        true
    }

    /// Non-blocking Registered -> in-flight transition.
    fn begin_refresh(&self) -> bool {
        let mut state = self.lock_state();
        if state.in_flight {
            return false;
        }
        state.in_flight = true;
        true
    }

    fn finish_refresh(&self, result: anyhow::Result<T>) {
        let mut state = self.lock_state();
        state.in_flight = false;
        match result {
            Ok(value) => {
                state.value = Some(value);
                state.refreshed_at = Some(unix_now_secs());
                state.last_error = None;
            }
            Err(e) => {
                // Keep the stale value; record the error for consumers.
                tracing::warn!(cache = self.name, error = %e, "refresh failed, keeping last-good value");
                state.last_error = Some(e.to_string());
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, EntryState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Spawns the background ticker for one entry. The first refresh runs
/// immediately, then every `refresh_interval`; a tick that fires while the
/// previous refresh is still running is a no-op (see `refresh`).
pub fn spawn_refresher<T, F, Fut>(
    cache: Arc<CachedQuery<T>>,
    refresh_interval: Duration,
    query: F,
) -> tokio::task::JoinHandle<()>
where
    T: Clone + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send,
{
    tokio::spawn(async move {
        let mut tick = interval(refresh_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tick.tick().await;
            cache.refresh(&query).await;
        }
    })
}

fn unix_now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
