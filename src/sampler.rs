// Sampling driver: collect -> persist -> broadcast on a fixed cadence.
// A failing sub-collector zeroes its field; only a tick where every
// collector fails is skipped. Persistence happens before broadcast so the
// stored history never lags what live viewers have already seen.

use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior, interval};

use crate::collector::{NetBaseline, SystemCollector};
use crate::hub::Hub;
use crate::models::MetricsSnapshot;
use crate::store::RetentionStore;

/// Number of independently fallible collector categories per tick.
const COLLECTOR_CATEGORIES: u32 = 6;

pub struct SamplerDeps {
    pub collector: Arc<SystemCollector>,
    pub store: Arc<RetentionStore>,
    pub hub: Arc<Hub>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

pub struct SamplerConfig {
    pub sample_interval_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: SamplerDeps, config: SamplerConfig) -> tokio::task::JoinHandle<()> {
    let SamplerDeps {
        collector,
        store,
        hub,
        mut shutdown_rx,
    } = deps;
    let SamplerConfig {
        sample_interval_ms,
        stats_log_interval_secs,
    } = config;

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(sample_interval_ms));
        // An overrunning tick delays the next tick start; ticks never
        // overlap and missed ones are not replayed in a burst.
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Previous tick's network counters, threaded between ticks to derive
        // transfer rates. Owned here; no collector-global state.
        let mut net_baseline: Option<NetBaseline> = None;
        let mut snapshots_saved: u64 = 0;

        let sampler_span = tracing::span!(tracing::Level::DEBUG, "sampler", sample_interval_ms);
        let _guard = sampler_span.enter();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    net_baseline =
                        sample_once(&collector, &store, &hub, net_baseline, &mut snapshots_saved)
                            .await;
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("sampler shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        viewers = hub.viewer_count(),
                        snapshots_saved,
                        "app stats"
                    );
                }
            }
        }
    })
}

/// One tick: build the snapshot from whatever collectors succeed, append it
/// to the store, then fan it out. Returns the network baseline for the next
/// tick.
async fn sample_once(
    collector: &SystemCollector,
    store: &RetentionStore,
    hub: &Hub,
    net_baseline: Option<NetBaseline>,
    snapshots_saved: &mut u64,
) -> Option<NetBaseline> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
            0
        });

    let mut failed = 0u32;

    let system = collector.system_info().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, operation = "system_info", "system info failed");
        failed += 1;
        Default::default()
    });
    let cpu = collector.cpu_stats().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, operation = "cpu_stats", "CPU stats failed");
        failed += 1;
        Default::default()
    });
    let memory = collector.memory_stats().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, operation = "memory_stats", "memory stats failed");
        failed += 1;
        Default::default()
    });
    let disk = collector.disk_stats().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, operation = "disk_stats", "disk stats failed");
        failed += 1;
        Default::default()
    });
    let (network, new_baseline) = match collector.network_stats(net_baseline).await {
        Ok((stats, baseline)) => (stats, Some(baseline)),
        Err(e) => {
            tracing::warn!(error = %e, operation = "network_stats", "network stats failed");
            failed += 1;
            (Default::default(), None)
        }
    };
    let temperatures = collector.temperatures().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, operation = "temperatures", "temperature read failed");
        failed += 1;
        Vec::new()
    });

    if failed >= COLLECTOR_CATEGORIES {
        tracing::warn!(operation = "sample", "no collector produced data, skipping tick");
        return new_baseline;
    }

    let snapshot = MetricsSnapshot {
        timestamp,
        system,
        cpu,
        memory,
        disk,
        network,
        temperatures,
    };

    // Persist first; a storage failure is a history gap, not a reason to
    // withhold the snapshot from live viewers.
    match store.append(&snapshot).await {
        Ok(()) => *snapshots_saved += 1,
        Err(e) => {
            tracing::warn!(error = %e, operation = "append", "failed to persist snapshot");
        }
    }

    let delivered = hub.broadcast(Arc::new(snapshot));
    tracing::trace!(delivered, "snapshot broadcast");

    new_baseline
}
