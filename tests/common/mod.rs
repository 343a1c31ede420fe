// Shared test helpers

use gopanel::models::*;

pub fn minimal_snapshot(timestamp: u64) -> MetricsSnapshot {
    MetricsSnapshot {
        timestamp,
        cpu: CpuStats {
            usage_percent: 10.0,
            ..Default::default()
        },
        memory: MemoryStats {
            total: 1024,
            used: 512,
            free: 512,
            available: 512,
            used_percent: 50.0,
            ..Default::default()
        },
        ..Default::default()
    }
}
