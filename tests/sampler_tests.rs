// Sampler loop tests: real collectors against a temp database and hub

use gopanel::collector::SystemCollector;
use gopanel::hub::{Hub, Viewer};
use gopanel::sampler::{self, SamplerConfig, SamplerDeps};
use gopanel::store::RetentionStore;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::oneshot;

async fn drain(viewer: &mut Viewer) -> usize {
    let mut count = 0;
    while viewer.rx.try_recv().is_ok() {
        count += 1;
    }
    count
}

#[tokio::test]
async fn sampler_persists_and_broadcasts_on_cadence() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("sampler.db");
    let store = Arc::new(
        RetentionStore::connect(db_path.to_str().unwrap(), 7)
            .await
            .unwrap(),
    );
    store.init().await.unwrap();
    let hub = Arc::new(Hub::new(64));
    let collector = Arc::new(SystemCollector::new());
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let mut early = hub.register();
    let handle = sampler::spawn(
        SamplerDeps {
            collector,
            store: store.clone(),
            hub: hub.clone(),
            shutdown_rx,
        },
        SamplerConfig {
            sample_interval_ms: 50,
            stats_log_interval_secs: 3600,
        },
    );

    tokio::time::sleep(tokio::time::Duration::from_millis(250)).await;
    let mut late = hub.register();
    tokio::time::sleep(tokio::time::Duration::from_millis(250)).await;

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    let early_count = drain(&mut early).await;
    let late_count = drain(&mut late).await;
    assert!(early_count >= 1, "early viewer saw no snapshots");
    assert!(late_count >= 1, "late viewer saw no snapshots");
    assert!(
        early_count >= late_count,
        "late viewer must not see snapshots from before it registered"
    );

    let records = store.query_range(1).await.unwrap();
    assert!(!records.is_empty(), "sampler persisted nothing");
    assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    // Snapshots carry real host identity, not defaults.
    assert!(records[0].system.cpu_threads > 0);
}

#[tokio::test]
async fn sampler_stops_on_shutdown_signal() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("sampler.db");
    let store = Arc::new(
        RetentionStore::connect(db_path.to_str().unwrap(), 7)
            .await
            .unwrap(),
    );
    store.init().await.unwrap();
    let hub = Arc::new(Hub::new(64));
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let handle = sampler::spawn(
        SamplerDeps {
            collector: Arc::new(SystemCollector::new()),
            store,
            hub: hub.clone(),
            shutdown_rx,
        },
        SamplerConfig {
            sample_interval_ms: 50,
            stats_log_interval_secs: 3600,
        },
    );

    tokio::time::sleep(tokio::time::Duration::from_millis(120)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    // No more broadcasts after the loop exits.
    let mut viewer = hub.register();
    tokio::time::sleep(tokio::time::Duration::from_millis(150)).await;
    assert!(viewer.rx.try_recv().is_err());
}
