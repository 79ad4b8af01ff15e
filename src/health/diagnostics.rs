//! Extended process and invocation details for `?detailed=true`.

use std::time::Instant;

use serde::Serialize;
use sysinfo::System;

use crate::handler::InvocationMeta;

/// Memory held by this process, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
}

impl MemoryUsage {
    /// Sample the current process. Zeroes when the platform cannot report it.
    pub fn current() -> Self {
        let Ok(pid) = sysinfo::get_current_pid() else {
            return Self::default();
        };

        let mut sys = System::new();
        sys.refresh_process(pid);
        sys.process(pid)
            .map(|p| Self {
                resident_bytes: p.memory(),
                virtual_bytes: p.virtual_memory(),
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationReport {
    pub function_name: String,
    pub function_version: String,
    #[serde(rename = "memoryLimitInMB")]
    pub memory_limit_in_mb: u32,
    pub remaining_time_in_millis: u64,
}

impl From<&InvocationMeta> for InvocationReport {
    fn from(meta: &InvocationMeta) -> Self {
        Self {
            function_name: meta.function_name.clone(),
            function_version: meta.function_version.clone(),
            memory_limit_in_mb: meta.memory_limit_mb,
            remaining_time_in_millis: meta.remaining_time().as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub memory: MemoryUsage,
    /// Seconds since the process started
    pub uptime: f64,
    pub invocation: InvocationReport,
}

impl Diagnostics {
    pub fn collect(started_at: Instant, meta: &InvocationMeta) -> Self {
        Self {
            memory: MemoryUsage::current(),
            uptime: started_at.elapsed().as_secs_f64(),
            invocation: InvocationReport::from(meta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_invocation_report_field_names() {
        let meta = InvocationMeta {
            function_name: "canopy-health".to_string(),
            function_version: "3".to_string(),
            memory_limit_mb: 512,
            deadline: Instant::now() + Duration::from_secs(10),
        };
        let json = serde_json::to_value(InvocationReport::from(&meta)).unwrap();
        assert_eq!(json["functionName"], "canopy-health");
        assert_eq!(json["functionVersion"], "3");
        assert_eq!(json["memoryLimitInMB"], 512);
        let remaining = json["remainingTimeInMillis"].as_u64().unwrap();
        assert!(remaining > 0 && remaining <= 10_000);
    }

    #[test]
    fn test_memory_usage_is_reported() {
        // Any running process holds some resident memory on supported platforms
        let usage = MemoryUsage::current();
        if sysinfo::IS_SUPPORTED_SYSTEM {
            assert!(usage.resident_bytes > 0);
        }
    }
}
