//! System monitor tool - CPU, memory, and disk metrics via sysinfo

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use sysinfo::{Disks, System};

use super::{HandlerError, ToolHandler};

fn to_gb(bytes: u64) -> f64 {
    (bytes as f64 / 1_073_741_824.0 * 100.0).round() / 100.0
}

/// Host resource monitoring tool
pub struct SystemMonitorTool {
    system: Mutex<System>,
}

impl SystemMonitorTool {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new_all()),
        }
    }

    fn cpu_info(&self) -> Value {
        let mut system = self.system.lock().unwrap();
        system.refresh_cpu();

        let per_core: Vec<f64> = system.cpus().iter().map(|cpu| cpu.cpu_usage() as f64).collect();

        json!({
            "action": "cpu",
            "usage_percent": system.global_cpu_info().cpu_usage() as f64,
            "usage_per_core": per_core,
            "core_count": system.physical_core_count().unwrap_or(0),
            "thread_count": system.cpus().len(),
            "brand": system.cpus().first().map(|cpu| cpu.brand().to_string()).unwrap_or_default()
        })
    }

    fn memory_info(&self) -> Value {
        let mut system = self.system.lock().unwrap();
        system.refresh_memory();

        json!({
            "action": "memory",
            "total_gb": to_gb(system.total_memory()),
            "used_gb": to_gb(system.used_memory()),
            "available_gb": to_gb(system.available_memory()),
            "swap_total_gb": to_gb(system.total_swap()),
            "swap_used_gb": to_gb(system.used_swap())
        })
    }

    fn disk_info(&self) -> Value {
        let disks = Disks::new_with_refreshed_list();

        let entries: Vec<Value> = disks
            .iter()
            .map(|disk| {
                json!({
                    "name": disk.name().to_string_lossy(),
                    "mount_point": disk.mount_point().to_string_lossy(),
                    "total_gb": to_gb(disk.total_space()),
                    "available_gb": to_gb(disk.available_space())
                })
            })
            .collect();

        let count = entries.len();
        json!({
            "action": "disk",
            "disks": entries,
            "count": count
        })
    }

    fn overview(&self) -> Value {
        let cpu = self.cpu_info();
        let memory = self.memory_info();

        json!({
            "action": "overview",
            "hostname": System::host_name().unwrap_or_default(),
            "os": System::name().unwrap_or_default(),
            "os_version": System::os_version().unwrap_or_default(),
            "uptime_secs": System::uptime(),
            "cpu_usage_percent": cpu["usage_percent"],
            "memory_used_gb": memory["used_gb"],
            "memory_total_gb": memory["total_gb"]
        })
    }
}

impl Default for SystemMonitorTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolHandler for SystemMonitorTool {
    fn name(&self) -> &'static str {
        "system_monitor"
    }

    fn description(&self) -> &'static str {
        "Monitor CPU, memory, disk, and system performance"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["system", "cpu", "memory", "disk", "performance", "process"]
    }

    async fn execute(&self, action: &str, _params: &Value) -> Result<Value, HandlerError> {
        match action {
            "cpu" => Ok(self.cpu_info()),
            "memory" => Ok(self.memory_info()),
            "disk" => Ok(self.disk_info()),
            "overview" | "execute" => Ok(self.overview()),
            other => Err(HandlerError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}
