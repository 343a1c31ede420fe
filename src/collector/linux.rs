// Linux-specific helpers: /proc, /sys/class/net, /sys/class/thermal.

use crate::models::Temperature;

/// Read first "model name" from /proc/cpuinfo (Linux). Prefer over sysinfo when it returns "cpu0" etc.
pub(super) fn read_cpu_model_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let name = line
                    .find(": ")
                    .map(|i| line[i + 2..].trim())
                    .filter(|s| !s.is_empty() && *s != "cpu0")?;
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Cached/Buffers from /proc/meminfo, in bytes. sysinfo does not expose them.
pub(super) fn read_meminfo_cached_buffers() -> Option<(u64, u64)> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/meminfo").ok()?;
        let mut cached = 0u64;
        let mut buffers = 0u64;
        for line in content.lines() {
            if let Some(rest) = line.strip_prefix("Cached:") {
                cached = parse_meminfo_kb(rest);
            } else if let Some(rest) = line.strip_prefix("Buffers:") {
                buffers = parse_meminfo_kb(rest);
            }
        }
        Some((cached, buffers))
    }
    #[cfg(not(target_os = "linux"))]
    None
}

#[cfg(target_os = "linux")]
fn parse_meminfo_kb(rest: &str) -> u64 {
    rest.trim()
        .trim_end_matches(" kB")
        .trim()
        .parse::<u64>()
        .map(|kb| kb * 1024)
        .unwrap_or(0)
}

/// Read network interface link speed from /sys/class/net/<interface>/speed (Linux).
/// Returns speed in bits per second, or 0 if unavailable.
pub(super) fn get_interface_speed(interface_name: &str) -> u64 {
    #[cfg(target_os = "linux")]
    {
        let path = format!("/sys/class/net/{}/speed", interface_name);
        if let Ok(content) = std::fs::read_to_string(&path)
            && let Ok(mbps) = content.trim().parse::<i64>()
            && mbps > 0
        {
            return (mbps as u64) * 1_000_000;
        }
    }
    0
}

/// Port of the Go panel's interface filter: keep Ethernet-type devices that
/// are either physical or a bridge on a docker host; skip tunnels and veth
/// pairs. Non-Linux keeps everything.
pub(super) fn is_real_interface(name: &str) -> bool {
    #[cfg(target_os = "linux")]
    {
        let base = format!("/sys/class/net/{}", name);
        // type 1 = Ethernet; tunnels (sit=776, ip6tnl=769) are excluded here.
        match std::fs::read_to_string(format!("{}/type", base)) {
            Ok(t) if t.trim() == "1" => {}
            _ => return false,
        }
        let dest = match std::fs::read_link(&base) {
            Ok(d) => d,
            Err(_) => return false,
        };
        if !dest.to_string_lossy().contains("/virtual/") {
            return true;
        }
        // veth (container point-to-point) has a peer_ifindex.
        if std::path::Path::new(&format!("{}/peer_ifindex", base)).exists() {
            return false;
        }
        // Bridges (docker0, br-xxx) only matter on docker hosts.
        if std::path::Path::new(&format!("{}/bridge", base)).exists() {
            return docker_installed();
        }
        false
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = name;
        true
    }
}

#[cfg(target_os = "linux")]
fn docker_installed() -> bool {
    std::env::var_os("PATH")
        .map(|paths| {
            std::env::split_paths(&paths).any(|dir| dir.join("docker").is_file())
        })
        .unwrap_or(false)
}

/// Thermal zone readings from /sys/class/thermal. Empty on non-Linux.
pub(super) fn read_thermal_zones() -> Vec<Temperature> {
    let mut temps = Vec::new();
    #[cfg(target_os = "linux")]
    for i in 0..10 {
        let data = match std::fs::read_to_string(format!("/sys/class/thermal/thermal_zone{}/temp", i)) {
            Ok(d) => d,
            Err(_) => break,
        };
        let millideg: f64 = data.trim().parse().unwrap_or(0.0);
        if millideg == 0.0 {
            continue;
        }
        let sensor = std::fs::read_to_string(format!("/sys/class/thermal/thermal_zone{}/type", i))
            .map(|s| s.trim().to_string())
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("zone{}", i));
        temps.push(Temperature {
            sensor,
            temperature: millideg / 1000.0,
        });
    }
    temps
}
