// Container listing via the docker CLI (same shell-out as the Go panel).
// `docker ps` gives the listing; `docker stats --no-stream` enriches it and
// is best-effort: if it fails, the stats fields stay zero.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;

use crate::models::ContainerInfo;

const PS_FORMAT: &str = r#"{"id":"{{.ID}}","name":"{{.Names}}","image":"{{.Image}}","status":"{{.Status}}","state":"{{.State}}","ports":"{{.Ports}}","created":"{{.CreatedAt}}"}"#;
const STATS_FORMAT: &str = "{{.ID}}\t{{.CPUPerc}}\t{{.MemPerc}}\t{{.MemUsage}}";

pub async fn list_containers(query_timeout: Duration) -> anyhow::Result<Vec<ContainerInfo>> {
    let out = super::run_command("docker", &["ps", "-a", "--format", PS_FORMAT], query_timeout)
        .await
        .context("docker not available")?;
    let mut containers = parse_ps_output(&out);

    match super::run_command(
        "docker",
        &["stats", "--no-stream", "--format", STATS_FORMAT],
        query_timeout,
    )
    .await
    {
        Ok(stats_out) => apply_stats(&mut containers, &stats_out),
        Err(e) => tracing::debug!(error = %e, "docker stats enrichment failed"),
    }
    Ok(containers)
}

/// One JSON object per line; malformed lines are skipped.
pub fn parse_ps_output(out: &str) -> Vec<ContainerInfo> {
    out.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

/// Merge `docker stats` TSV rows (id, cpu%, mem%, "used / limit") into the
/// listing by container id.
pub fn apply_stats(containers: &mut [ContainerInfo], stats_out: &str) {
    let mut by_id: HashMap<&str, (f64, f64, u64, u64)> = HashMap::new();
    for line in stats_out.lines() {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 4 {
            continue;
        }
        let cpu = parts[1].trim_end_matches('%').parse().unwrap_or(0.0);
        let mem_pct = parts[2].trim_end_matches('%').parse().unwrap_or(0.0);
        let (used, limit) = match parts[3].split_once(" / ") {
            Some((u, l)) => (parse_mem_size(u), parse_mem_size(l)),
            None => (0, 0),
        };
        by_id.insert(parts[0], (cpu, mem_pct, used, limit));
    }
    for c in containers {
        if let Some((cpu, mem_pct, used, limit)) = by_id.get(c.id.as_str()) {
            c.cpu_percent = *cpu;
            c.mem_percent = *mem_pct;
            c.mem_used = *used;
            c.mem_limit = *limit;
        }
    }
}

/// Parse docker's human sizes ("128MiB", "2GiB", "512KB") into bytes.
/// Suffixes are case-sensitive, matching what `docker stats` emits for
/// memory usage.
pub fn parse_mem_size(s: &str) -> u64 {
    const MULTIPLIERS: [(&str, u64); 7] = [
        ("KiB", 1024),
        ("MiB", 1024 * 1024),
        ("GiB", 1024 * 1024 * 1024),
        ("KB", 1000),
        ("MB", 1_000_000),
        ("GB", 1_000_000_000),
        ("B", 1),
    ];
    let s = s.trim();
    for (suffix, mult) in MULTIPLIERS {
        if let Some(num) = s.strip_suffix(suffix) {
            let val: f64 = num.trim().parse().unwrap_or(0.0);
            return (val * mult as f64) as u64;
        }
    }
    s.parse().unwrap_or(0)
}
