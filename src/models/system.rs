// CPU, memory, system identity, temperatures and the per-tick snapshot

use serde::{Deserialize, Serialize};
use wincode::{SchemaRead, SchemaWrite};

use super::{DiskStats, NetworkStats};

/// System identity plus uptime. Sent in every snapshot (the Go panel does
/// the same) and also served standalone on GET /api/info.
#[derive(Debug, Clone, Default, Serialize, Deserialize, SchemaRead, SchemaWrite)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub hostname: String,
    pub os: String,
    pub platform: String,
    pub platform_version: String,
    pub kernel_version: String,
    pub arch: String,
    pub uptime_secs: u64,
    pub uptime_str: String,
    pub boot_time: u64,
    pub cpu_model: String,
    pub cpu_cores: u32,
    pub cpu_threads: u32,
    pub local_ips: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, SchemaRead, SchemaWrite)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    pub usage_percent: f64,
    pub per_core_usage: Vec<f64>,
    pub load_avg_1: f64,
    pub load_avg_5: f64,
    pub load_avg_15: f64,
    pub frequency_mhz: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, SchemaRead, SchemaWrite)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub available: u64,
    pub used_percent: f64,
    pub swap_total: u64,
    pub swap_used: u64,
    pub swap_free: u64,
    pub swap_percent: f64,
    pub cached: u64,
    pub buffers: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, SchemaRead, SchemaWrite)]
#[serde(rename_all = "camelCase")]
pub struct Temperature {
    pub sensor: String,
    pub temperature: f64,
}

/// One immutable point-in-time bundle of metrics. Produced once per sampler
/// tick, persisted first, then fanned out to every connected viewer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, SchemaRead, SchemaWrite)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub system: SystemInfo,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub disk: DiskStats,
    pub network: NetworkStats,
    pub temperatures: Vec<Temperature>,
}

/// "1d 4h 12m" style uptime, as the Go panel renders it.
pub(crate) fn format_uptime(secs: u64) -> String {
    let d = secs / 86_400;
    let h = (secs % 86_400) / 3_600;
    let m = (secs % 3_600) / 60;
    if d > 0 {
        format!("{}d {}h {}m", d, h, m)
    } else {
        format!("{}h {}m", h, m)
    }
}

#[cfg(test)]
mod tests {
    use super::format_uptime;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(59), "0h 0m");
        assert_eq!(format_uptime(3_660), "1h 1m");
        assert_eq!(format_uptime(90_000), "1d 1h 0m");
    }
}
