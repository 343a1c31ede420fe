use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sampling: SamplingConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8090,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    /// Retention horizon: snapshots older than this are pruned after each append.
    pub retention_days: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/gopanel.db".into(),
            retention_days: 7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub interval_ms: u64,
    /// Bounded outbound queue per WebSocket viewer; a viewer that lets it
    /// fill up is dropped rather than allowed to stall the sampler.
    pub viewer_queue_capacity: usize,
    /// How often to log app stats (viewer count, snapshots saved) at INFO level.
    pub stats_log_interval_secs: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            viewer_queue_capacity: 16,
            stats_log_interval_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Background refresh interval for the docker/services listings.
    pub refresh_interval_secs: u64,
    /// Upper bound on a single external query (docker/systemctl shell-out).
    pub query_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            query_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Load from CONFIG_FILE (default config.toml). A missing file is not an
    /// error: the Go panel starts with defaults and logs, so do we.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s),
            Err(e) => {
                tracing::warn!(error = %e, path = %path, "no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.retention_days > 0,
            "database.retention_days must be > 0, got {}",
            self.database.retention_days
        );
        anyhow::ensure!(
            self.sampling.interval_ms > 0,
            "sampling.interval_ms must be > 0, got {}",
            self.sampling.interval_ms
        );
        anyhow::ensure!(
            self.sampling.viewer_queue_capacity > 0,
            "sampling.viewer_queue_capacity must be > 0, got {}",
            self.sampling.viewer_queue_capacity
        );
        anyhow::ensure!(
            self.sampling.stats_log_interval_secs > 0,
            "sampling.stats_log_interval_secs must be > 0, got {}",
            self.sampling.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.cache.refresh_interval_secs > 0,
            "cache.refresh_interval_secs must be > 0, got {}",
            self.cache.refresh_interval_secs
        );
        anyhow::ensure!(
            self.cache.query_timeout_secs > 0,
            "cache.query_timeout_secs must be > 0, got {}",
            self.cache.query_timeout_secs
        );
        Ok(())
    }
}
