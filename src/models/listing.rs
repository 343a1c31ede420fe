// Container and service listing models (external-query results, not persisted)

use serde::{Deserialize, Serialize};

/// One row of `docker ps`, enriched with `docker stats` when available.
/// Stats fields stay zero when enrichment fails or the container is stopped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub image: String,
    pub status: String,
    pub state: String,
    pub ports: String,
    pub created: String,
    #[serde(default)]
    pub cpu_percent: f64,
    #[serde(default)]
    pub mem_percent: f64,
    #[serde(default)]
    pub mem_used: u64,
    #[serde(default)]
    pub mem_limit: u64,
}

/// One systemd unit from `systemctl list-units --type=service`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUnit {
    pub unit: String,
    pub load: String,
    pub active: String,
    pub sub: String,
    pub description: String,
}
