// System metrics via sysinfo (gopsutil equivalent), with /proc and /sys
// fallbacks on Linux. Each category fails independently; the sampler zeroes
// what it cannot collect instead of dropping the tick.

mod linux;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use sysinfo::{Disks, Networks, System};
use thiserror::Error;
use tracing::instrument;

use crate::models::{
    CpuStats, DiskStats, InterfaceStat, MemoryStats, NetworkStats, PartitionStat, SystemInfo,
    Temperature,
};

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("sysinfo lock poisoned: {0}")]
    Lock(String),
    #[error("collector task join: {0}")]
    Join(String),
}

/// Cumulative per-interface counters from one tick, owned by the sampler and
/// threaded back into the next `network_stats` call to derive transfer
/// rates. No global state survives between ticks.
#[derive(Debug, Clone)]
pub struct NetBaseline {
    taken_at: Instant,
    /// interface name -> (bytes received, bytes sent)
    counters: HashMap<String, (u64, u64)>,
}

pub struct SystemCollector {
    sys: Arc<std::sync::Mutex<System>>,
    disks: Arc<std::sync::Mutex<Disks>>,
    networks: Arc<std::sync::Mutex<Networks>>,
    last_cpu_refresh: Arc<std::sync::Mutex<Option<(Instant, f64, Vec<f64>)>>>,
}

impl Default for SystemCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCollector {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();
        Self {
            sys: Arc::new(std::sync::Mutex::new(sys)),
            disks: Arc::new(std::sync::Mutex::new(disks)),
            networks: Arc::new(std::sync::Mutex::new(networks)),
            last_cpu_refresh: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    #[instrument(skip(self), fields(repo = "collector", operation = "system_info"))]
    pub async fn system_info(&self) -> Result<SystemInfo, CollectError> {
        let sys = self.sys.clone();
        let networks = self.networks.clone();
        tokio::task::spawn_blocking(move || {
            let sys = sys.lock().map_err(|e| CollectError::Lock(e.to_string()))?;
            let uptime = System::uptime();
            let cpu_model = linux::read_cpu_model_linux()
                .or_else(|| {
                    sys.cpus()
                        .first()
                        .map(|c| c.name().to_string())
                        .filter(|s| !s.is_empty() && s != "cpu0")
                })
                .unwrap_or_else(|| "Unknown".into());

            let mut local_ips = Vec::new();
            if let Ok(networks) = networks.lock() {
                for (name, data) in networks.list() {
                    if !linux::is_real_interface(name) {
                        continue;
                    }
                    for net in data.ip_networks() {
                        if !net.addr.is_loopback() {
                            local_ips.push(net.addr.to_string());
                        }
                    }
                }
            }

            Ok(SystemInfo {
                hostname: System::host_name().unwrap_or_default(),
                os: std::env::consts::OS.to_string(),
                platform: System::name().unwrap_or_default(),
                platform_version: System::os_version().unwrap_or_default(),
                kernel_version: System::kernel_version().unwrap_or_default(),
                arch: std::env::consts::ARCH.to_string(),
                uptime_secs: uptime,
                uptime_str: crate::models::format_uptime(uptime),
                boot_time: System::boot_time(),
                cpu_model,
                cpu_cores: System::physical_core_count().unwrap_or(0) as u32,
                cpu_threads: sys.cpus().len() as u32,
                local_ips,
            })
        })
        .await
        .map_err(|e| CollectError::Join(e.to_string()))?
    }

    #[instrument(skip(self), fields(repo = "collector", operation = "cpu_stats"))]
    pub async fn cpu_stats(&self) -> Result<CpuStats, CollectError> {
        let sys = self.sys.clone();
        let last_cpu_refresh = self.last_cpu_refresh.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys.lock().map_err(|e| CollectError::Lock(e.to_string()))?;

            let now = Instant::now();
            let (usage, per_core) = {
                let mut guard = last_cpu_refresh
                    .lock()
                    .map_err(|e| CollectError::Lock(e.to_string()))?;
                match &*guard {
                    Some((prev_ts, prev_usage, prev_per_core))
                        if now.duration_since(*prev_ts) < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL =>
                    {
                        // Too soon for a meaningful delta; reuse the last reading.
                        (*prev_usage, prev_per_core.clone())
                    }
                    _ => {
                        sys.refresh_cpu_all();
                        let usage = sys.global_cpu_usage() as f64;
                        let per_core: Vec<f64> =
                            sys.cpus().iter().map(|c| c.cpu_usage() as f64).collect();
                        *guard = Some((now, usage, per_core.clone()));
                        (usage, per_core)
                    }
                }
            };

            let load = System::load_average();
            let frequency_mhz = sys.cpus().first().map(|c| c.frequency() as f64).unwrap_or(0.0);

            Ok(CpuStats {
                usage_percent: usage.clamp(0.0, 100.0),
                per_core_usage: per_core,
                load_avg_1: load.one,
                load_avg_5: load.five,
                load_avg_15: load.fifteen,
                frequency_mhz,
            })
        })
        .await
        .map_err(|e| CollectError::Join(e.to_string()))?
    }

    #[instrument(skip(self), fields(repo = "collector", operation = "memory_stats"))]
    pub async fn memory_stats(&self) -> Result<MemoryStats, CollectError> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys.lock().map_err(|e| CollectError::Lock(e.to_string()))?;
            sys.refresh_memory();

            let total = sys.total_memory();
            let available = sys.available_memory();
            let free = sys.free_memory();
            let used = total.saturating_sub(available);
            let used_percent = if total > 0 {
                (used as f64 / total as f64) * 100.0
            } else {
                0.0
            };

            let swap_total = sys.total_swap();
            let swap_used = sys.used_swap();
            let swap_percent = if swap_total > 0 {
                (swap_used as f64 / swap_total as f64) * 100.0
            } else {
                0.0
            };

            let (cached, buffers) = linux::read_meminfo_cached_buffers().unwrap_or((0, 0));

            Ok(MemoryStats {
                total,
                used,
                free,
                available,
                used_percent,
                swap_total,
                swap_used,
                swap_free: swap_total.saturating_sub(swap_used),
                swap_percent,
                cached,
                buffers,
            })
        })
        .await
        .map_err(|e| CollectError::Join(e.to_string()))?
    }

    #[instrument(skip(self), fields(repo = "collector", operation = "disk_stats"))]
    pub async fn disk_stats(&self) -> Result<DiskStats, CollectError> {
        let disks = self.disks.clone();
        tokio::task::spawn_blocking(move || {
            let mut disks_guard = disks.lock().map_err(|e| CollectError::Lock(e.to_string()))?;
            disks_guard.refresh(true);

            let mut seen = std::collections::HashSet::new();
            let mut partitions = Vec::new();
            for d in disks_guard.list() {
                let mountpoint = d.mount_point().to_string_lossy().into_owned();
                if !mountpoint.starts_with('/') || !seen.insert(mountpoint.clone()) {
                    continue;
                }
                let total = d.total_space();
                if total == 0 {
                    continue;
                }
                let free = d.available_space();
                let used = total.saturating_sub(free);
                let usage = d.usage();
                partitions.push(PartitionStat {
                    device: d.name().to_string_lossy().into_owned(),
                    mountpoint,
                    fstype: d.file_system().to_string_lossy().into_owned(),
                    total,
                    used,
                    free,
                    used_percent: (used as f64 / total as f64) * 100.0,
                    read_bytes: usage.total_read_bytes,
                    write_bytes: usage.total_written_bytes,
                });
            }
            Ok(DiskStats { partitions })
        })
        .await
        .map_err(|e| CollectError::Join(e.to_string()))?
    }

    /// Samples interface counters and derives transfer rates against the
    /// previous tick's baseline. Returns the fresh baseline for the caller
    /// to hold until the next tick.
    #[instrument(skip(self, baseline), fields(repo = "collector", operation = "network_stats"))]
    pub async fn network_stats(
        &self,
        baseline: Option<NetBaseline>,
    ) -> Result<(NetworkStats, NetBaseline), CollectError> {
        let networks = self.networks.clone();
        tokio::task::spawn_blocking(move || {
            let mut networks_guard = networks
                .lock()
                .map_err(|e| CollectError::Lock(e.to_string()))?;
            networks_guard.refresh(true);

            let now = Instant::now();
            let elapsed = baseline
                .as_ref()
                .map(|b| now.duration_since(b.taken_at).as_secs_f64())
                .filter(|dt| *dt >= 0.1)
                .unwrap_or(1.0);

            let mut interfaces = Vec::new();
            let mut counters = HashMap::new();
            let mut total_sent = 0u64;
            let mut total_recv = 0u64;
            for (name, data) in networks_guard.list() {
                if !linux::is_real_interface(name) {
                    continue;
                }
                let bytes_recv = data.total_received();
                let bytes_sent = data.total_transmitted();
                total_recv += bytes_recv;
                total_sent += bytes_sent;

                let (speed_down, speed_up) = match baseline
                    .as_ref()
                    .and_then(|b| b.counters.get(name))
                {
                    Some((prev_recv, prev_sent)) => (
                        (bytes_recv.saturating_sub(*prev_recv) as f64 / elapsed) as u64,
                        (bytes_sent.saturating_sub(*prev_sent) as f64 / elapsed) as u64,
                    ),
                    None => (0, 0),
                };

                counters.insert(name.clone(), (bytes_recv, bytes_sent));
                interfaces.push(InterfaceStat {
                    name: name.clone(),
                    mac_address: data.mac_address().to_string(),
                    addrs: data
                        .ip_networks()
                        .iter()
                        .map(|n| n.addr.to_string())
                        .collect(),
                    bytes_sent,
                    bytes_recv,
                    packets_sent: data.total_packets_transmitted(),
                    packets_recv: data.total_packets_received(),
                    speed_up,
                    speed_down,
                    link_speed: linux::get_interface_speed(name),
                });
            }
            interfaces.sort_by(|a, b| a.name.cmp(&b.name));

            Ok((
                NetworkStats {
                    interfaces,
                    total_sent,
                    total_recv,
                },
                NetBaseline {
                    taken_at: now,
                    counters,
                },
            ))
        })
        .await
        .map_err(|e| CollectError::Join(e.to_string()))?
    }

    #[instrument(skip(self), fields(repo = "collector", operation = "temperatures"))]
    pub async fn temperatures(&self) -> Result<Vec<Temperature>, CollectError> {
        tokio::task::spawn_blocking(linux::read_thermal_zones)
            .await
            .map_err(|e| CollectError::Join(e.to_string()))
    }
}
