//! System and process memory sampling.
//!
//! On Linux the values come from `/proc/meminfo` and `/proc/self/status`.
//! Elsewhere, or when a file cannot be read, the corresponding field is `None`
//! and report lines print it as `-`.

use serde::{Deserialize, Serialize};

const MEMINFO_PATH: &str = "/proc/meminfo";
const SELF_STATUS_PATH: &str = "/proc/self/status";

/// Point-in-time memory usage of the host and of this process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    /// Physical memory in use system-wide (total minus available), in bytes
    pub system_used_bytes: Option<u64>,

    /// Resident set size of the current process, in bytes
    pub process_resident_bytes: Option<u64>,
}

impl MemoryUsage {
    /// Sample the current memory usage.
    pub fn sample() -> Self {
        Self {
            system_used_bytes: read_proc(MEMINFO_PATH).and_then(|s| parse_meminfo(&s)),
            process_resident_bytes: read_proc(SELF_STATUS_PATH)
                .and_then(|s| parse_status_rss(&s)),
        }
    }
}

#[cfg(target_os = "linux")]
fn read_proc(path: &str) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

#[cfg(not(target_os = "linux"))]
fn read_proc(_path: &str) -> Option<String> {
    None
}

/// Parse `MemTotal - MemAvailable` out of `/proc/meminfo` content, in bytes.
pub fn parse_meminfo(content: &str) -> Option<u64> {
    let total = find_kb_field(content, "MemTotal:")?;
    let available = find_kb_field(content, "MemAvailable:")?;
    Some(total.saturating_sub(available) * 1024)
}

/// Parse `VmRSS` out of `/proc/<pid>/status` content, in bytes.
pub fn parse_status_rss(content: &str) -> Option<u64> {
    find_kb_field(content, "VmRSS:").map(|kb| kb * 1024)
}

fn find_kb_field(content: &str, key: &str) -> Option<u64> {
    content
        .lines()
        .find_map(|line| line.strip_prefix(key))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "MemTotal:       16314248 kB\n\
                           MemFree:         1203412 kB\n\
                           MemAvailable:    8157124 kB\n\
                           Buffers:          402112 kB\n";

    const STATUS: &str = "Name:\torbis\n\
                          VmPeak:\t  120000 kB\n\
                          VmRSS:\t   45678 kB\n\
                          Threads:\t4\n";

    #[test]
    fn test_parse_meminfo() {
        assert_eq!(parse_meminfo(MEMINFO), Some((16314248 - 8157124) * 1024));
    }

    #[test]
    fn test_parse_meminfo_missing_available() {
        assert_eq!(parse_meminfo("MemTotal: 1000 kB\n"), None);
    }

    #[test]
    fn test_parse_status_rss() {
        assert_eq!(parse_status_rss(STATUS), Some(45678 * 1024));
        assert_eq!(parse_status_rss("Name:\torbis\n"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_sample_on_linux() {
        let usage = MemoryUsage::sample();
        assert!(usage.system_used_bytes.unwrap_or(0) > 0);
        assert!(usage.process_resident_bytes.unwrap_or(0) > 0);
    }
}
