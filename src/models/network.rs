// Network interface models

use serde::{Deserialize, Serialize};
use wincode::{SchemaRead, SchemaWrite};

#[derive(Debug, Clone, Default, Serialize, Deserialize, SchemaRead, SchemaWrite)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceStat {
    pub name: String,
    pub mac_address: String,
    pub addrs: Vec<String>,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    /// Upload rate in bytes/sec, derived from the previous tick's counters.
    #[serde(default)]
    pub speed_up: u64,
    /// Download rate in bytes/sec, derived from the previous tick's counters.
    #[serde(default)]
    pub speed_down: u64,
    /// Link speed in bits/sec from /sys/class/net, 0 if unknown.
    pub link_speed: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, SchemaRead, SchemaWrite)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub interfaces: Vec<InterfaceStat>,
    pub total_sent: u64,
    pub total_recv: u64,
}
