use anyhow::Result;
use gopanel::*;
use std::sync::Arc;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let collector = Arc::new(collector::SystemCollector::new());
    let system_info = Arc::new(
        collector
            .system_info()
            .await
            .map_err(|e| anyhow::anyhow!("system info: {}", e))?,
    );
    let store = Arc::new(
        store::RetentionStore::connect(
            &app_config.database.path,
            app_config.database.retention_days,
        )
        .await?,
    );
    store.init().await?;

    let hub = Arc::new(hub::Hub::new(app_config.sampling.viewer_queue_capacity));

    // Refresh caches for the two expensive shell-outs; request handlers only
    // ever read them, the tickers below do the actual work.
    let containers = Arc::new(cache::CachedQuery::new("docker_containers"));
    let services = Arc::new(cache::CachedQuery::new("systemd_services"));
    let refresh_interval = Duration::from_secs(app_config.cache.refresh_interval_secs);
    let query_timeout = Duration::from_secs(app_config.cache.query_timeout_secs);
    cache::spawn_refresher(containers.clone(), refresh_interval, move || {
        external::docker::list_containers(query_timeout)
    });
    cache::spawn_refresher(services.clone(), refresh_interval, move || {
        external::services::list_services(query_timeout)
    });

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let sampler_handle = sampler::spawn(
        sampler::SamplerDeps {
            collector: collector.clone(),
            store: store.clone(),
            hub: hub.clone(),
            shutdown_rx,
        },
        sampler::SamplerConfig {
            sample_interval_ms: app_config.sampling.interval_ms,
            stats_log_interval_secs: app_config.sampling.stats_log_interval_secs,
        },
    );

    let app = routes::app(hub, system_info, store, containers, services);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("GoPanel {} listening on http://{}", version::VERSION, addr);

    let in_container = std::path::Path::new("/.dockerenv").exists()
        || std::env::var("CONTAINER").as_deref() == Ok("1");

    if in_container {
        // In Docker: run server until error or SIGTERM (no signal handler; avoids immediate exit)
        axum::serve(listener, app).await?;
    } else {
        tokio::select! {
            result = axum::serve(listener, app) => {
                result?;
            }
            _ = async {
                #[cfg(unix)]
                {
                    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                        Ok(s) => s,
                        Err(_) => {
                            let _ = tokio::signal::ctrl_c().await;
                            return;
                        }
                    };
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                #[cfg(not(unix))]
                {
                    let _ = tokio::signal::ctrl_c().await;
                }
            } => {
                tracing::info!("Received shutdown signal");
                let _ = shutdown_tx.send(());
                let _ = sampler_handle.await;
            }
        }
    }

    Ok(())
}
