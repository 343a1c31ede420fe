// SQLite retention store: append-only snapshot log, time-range reads,
// pruning against the retention horizon after each write.

mod blob;

use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::instrument;

use crate::models::MetricsSnapshot;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] sqlx::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encode: {0}")]
    Encode(String),
    #[error("system clock before epoch: {0}")]
    Clock(#[from] std::time::SystemTimeError),
}

/// Single-writer history of snapshots. The sampler is the only appender;
/// range queries from the API run concurrently against the same pool and
/// see whole records only (one row per snapshot, inserted in one statement).
pub struct RetentionStore {
    pool: SqlitePool,
    retention_secs: i64,
}

impl RetentionStore {
    pub async fn connect(path: &str, retention_days: u32) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))
            .map_err(StoreError::Sqlite)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new().connect_with(opts).await?;
        let retention_secs = (retention_days as i64) * 24 * 60 * 60;
        Ok(Self {
            pool,
            retention_secs,
        })
    }

    pub async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS metrics_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at INTEGER NOT NULL,
                cpu_load REAL NOT NULL,
                memory_used INTEGER NOT NULL,
                data BLOB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_metrics_created_at ON metrics_history(created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persists one snapshot (durable once this returns) and then prunes
    /// anything past the retention horizon. A prune failure is logged and
    /// never surfaced; the append has already succeeded.
    #[instrument(skip(self, snapshot), fields(repo = "store", operation = "append"))]
    pub async fn append(&self, snapshot: &MetricsSnapshot) -> Result<(), StoreError> {
        let data = blob::with_version_prefix(
            blob::BLOB_VERSION,
            wincode::serialize(snapshot).map_err(|e| StoreError::Encode(e.to_string()))?,
        );
        sqlx::query(
            "INSERT INTO metrics_history (created_at, cpu_load, memory_used, data) VALUES ($1, $2, $3, $4)",
        )
        .bind(snapshot.timestamp as i64)
        .bind(snapshot.cpu.usage_percent)
        .bind(snapshot.memory.used as i64)
        .bind(&data)
        .execute(&self.pool)
        .await?;

        if let Err(e) = self.prune_old_data().await {
            tracing::warn!(error = %e, operation = "prune_old_data", "failed to prune old data");
        }
        Ok(())
    }

    /// All snapshots with created_at >= now - since_hours, ascending.
    /// An empty window returns an empty vec, never an error.
    #[instrument(skip(self), fields(repo = "store", operation = "query_range"))]
    pub async fn query_range(&self, since_hours: u32) -> Result<Vec<MetricsSnapshot>, StoreError> {
        let cutoff = unix_now_secs()? - (since_hours as i64) * 3600;
        let rows = sqlx::query(
            "SELECT created_at, data FROM metrics_history WHERE created_at >= $1 ORDER BY created_at ASC",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let created_at: i64 = row.try_get("created_at")?;
            let data: Vec<u8> = row.try_get("data")?;
            let mut snapshot: MetricsSnapshot =
                wincode::deserialize(blob::blob_payload(&data, blob::BLOB_VERSION))
                    .unwrap_or_else(|e| {
                        tracing::debug!(error = %e, "wincode deserialize snapshot (legacy/corrupt), using empty");
                        MetricsSnapshot::default()
                    });
            snapshot.timestamp = created_at as u64;
            out.push(snapshot);
        }
        Ok(out)
    }

    /// Delete rows older than the retention horizon. Returns rows removed.
    #[instrument(skip(self), fields(repo = "store", operation = "prune_old_data"))]
    pub async fn prune_old_data(&self) -> Result<u64, StoreError> {
        let cutoff = unix_now_secs()? - self.retention_secs;
        let r = sqlx::query("DELETE FROM metrics_history WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected())
    }
}

fn unix_now_secs() -> Result<i64, std::time::SystemTimeError> {
    Ok(std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs() as i64)
}
