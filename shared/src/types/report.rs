//! Periodic frame metrics report
//!
//! One `MetricsReport` is produced per reporter tick. It is serialized as-is
//! for JSON output and renders the classic single-line summary via `Display`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::format_kb;
use crate::utils::memory::MemoryUsage;

/// Separator between fields of the summary line
const FIELD_SEPARATOR: &str = "    ";

/// Frame timing and memory statistics for one reporting window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Monotonic report number within the session, starting at 1
    pub sequence: u64,

    /// Label of the session the report belongs to
    pub session: String,

    /// When the report was assembled
    pub reported_at: DateTime<Utc>,

    /// Milliseconds since the session started
    pub session_uptime_ms: u64,

    /// Host and process memory at report time
    pub memory: MemoryUsage,

    /// Bytes held by the render-resource cache at report time
    pub render_cache_bytes: u64,

    /// Average render time over the window, in milliseconds
    pub render_time_avg_ms: f64,

    /// Average draw time over the window, in milliseconds
    pub draw_time_avg_ms: f64,

    /// Render samples in the window
    pub render_frames: u64,

    /// Draw samples in the window
    pub draw_frames: u64,
}

impl MetricsReport {
    /// Combined average frame time (render + draw), in milliseconds
    pub fn frame_time_avg_ms(&self) -> f64 {
        self.render_time_avg_ms + self.draw_time_avg_ms
    }
}

fn kb_or_dash(bytes: Option<u64>) -> String {
    bytes.map(format_kb).unwrap_or_else(|| "-".to_string())
}

/// One-line summary in the render loop's log layout. The "Heap memory" column
/// carries the process resident set size.
impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "System memory {} KB{sep}Heap memory {} KB{sep}Render cache {} KB{sep}Frame time {:.1} ms + {:.1} ms",
            kb_or_dash(self.memory.system_used_bytes),
            kb_or_dash(self.memory.process_resident_bytes),
            format_kb(self.render_cache_bytes),
            self.render_time_avg_ms,
            self.draw_time_avg_ms,
            sep = FIELD_SEPARATOR,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> MetricsReport {
        MetricsReport {
            sequence: 1,
            session: "basic-globe".into(),
            reported_at: Utc::now(),
            session_uptime_ms: 3000,
            memory: MemoryUsage {
                system_used_bytes: Some(1_234_567 * 1024),
                process_resident_bytes: Some(45_678 * 1024),
            },
            render_cache_bytes: 2048 * 1024,
            render_time_avg_ms: 12.34,
            draw_time_avg_ms: 4.46,
            render_frames: 180,
            draw_frames: 180,
        }
    }

    #[test]
    fn test_display_layout() {
        let line = sample_report().to_string();
        assert_eq!(
            line,
            "System memory 1,234,567 KB    Heap memory 45,678 KB    Render cache 2,048 KB    Frame time 12.3 ms + 4.5 ms"
        );
    }

    #[test]
    fn test_display_unknown_memory() {
        let mut report = sample_report();
        report.memory = MemoryUsage::default();
        let line = report.to_string();
        assert!(line.starts_with("System memory - KB    Heap memory - KB"));
    }

    #[test]
    fn test_json_roundtrip() {
        let report = sample_report();
        let json = serde_json::to_string(&report).unwrap();
        let back: MetricsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
        assert!((back.frame_time_avg_ms() - 16.8).abs() < 1e-9);
    }
}
