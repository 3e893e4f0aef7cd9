//! Process resource snapshot for the metrics endpoint

use serde::Serialize;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

const MB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SystemMetrics {
    pub cpu_count: usize,
    /// Process CPU usage; can exceed 100 on multi-core hosts
    pub process_cpu_percent: f32,
    pub process_memory_mb: u64,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
}

impl SystemMetrics {
    /// Sample the current process and host memory
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        // cpus() is empty until CPU usage has been refreshed once
        sys.refresh_cpu_usage();

        let pid = Pid::from_u32(std::process::id());
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::new().with_cpu().with_memory(),
        );

        let (process_cpu_percent, process_memory_mb) = match sys.process(pid) {
            Some(p) => (p.cpu_usage(), p.memory() / MB),
            None => (0.0, 0),
        };

        Self {
            cpu_count: sys.cpus().len(),
            process_cpu_percent,
            process_memory_mb,
            memory_used_mb: sys.used_memory() / MB,
            memory_total_mb: sys.total_memory() / MB,
        }
    }
}
