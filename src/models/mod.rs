// Domain models (ported from the Go collector types)

mod listing;
mod network;
mod storage;
mod system;

pub use listing::{ContainerInfo, ServiceUnit};
pub use network::{InterfaceStat, NetworkStats};
pub use storage::{DiskStats, PartitionStat};
pub use system::{CpuStats, MemoryStats, MetricsSnapshot, SystemInfo, Temperature};

pub(crate) use system::format_uptime;
