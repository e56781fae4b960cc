//! Prometheus export of the most recent frame metrics report

use once_cell::sync::Lazy;
use orbis_shared::MetricsReport;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, Counter, CounterVec, Encoder, Gauge,
    TextEncoder,
};

use crate::error::{MetricsError, Result};

// ── Frame timing ─────────────────────────────────────────────────────────────

pub static RENDER_TIME_AVG: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "orbis_render_time_avg_ms",
        "Average render time over the last reporting window"
    )
    .unwrap()
});

pub static DRAW_TIME_AVG: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "orbis_draw_time_avg_ms",
        "Average draw time over the last reporting window"
    )
    .unwrap()
});

pub static FRAMES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!("orbis_frames_total", "Frame samples reported", &["phase"]).unwrap()
});

// ── Memory ───────────────────────────────────────────────────────────────────

pub static RENDER_CACHE_BYTES: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "orbis_render_cache_bytes",
        "Bytes held by the render-resource cache"
    )
    .unwrap()
});

pub static SYSTEM_MEMORY_USED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "orbis_system_memory_used_bytes",
        "Physical memory in use system-wide"
    )
    .unwrap()
});

pub static PROCESS_RESIDENT: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "orbis_process_resident_bytes",
        "Resident set size of this process"
    )
    .unwrap()
});

// ── Reporter ─────────────────────────────────────────────────────────────────

pub static REPORTS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!("orbis_reports_total", "Frame metrics reports produced").unwrap()
});

/// Update every exported series from one report.
///
/// `new_render_frames` and `new_draw_frames` are the frames not yet counted
/// by `orbis_frames_total`. For a cumulative report they are smaller than the
/// report's own frame counts.
pub fn observe_report(report: &MetricsReport, new_render_frames: u64, new_draw_frames: u64) {
    RENDER_TIME_AVG.set(report.render_time_avg_ms);
    DRAW_TIME_AVG.set(report.draw_time_avg_ms);
    FRAMES_TOTAL
        .with_label_values(&["render"])
        .inc_by(new_render_frames as f64);
    FRAMES_TOTAL
        .with_label_values(&["draw"])
        .inc_by(new_draw_frames as f64);
    RENDER_CACHE_BYTES.set(report.render_cache_bytes as f64);
    if let Some(bytes) = report.memory.system_used_bytes {
        SYSTEM_MEMORY_USED.set(bytes as f64);
    }
    if let Some(bytes) = report.memory.process_resident_bytes {
        PROCESS_RESIDENT.set(bytes as f64);
    }
    REPORTS_TOTAL.inc();
}

/// Render all registered metrics to Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&families, &mut buffer)
        .map_err(|e| MetricsError::Encode(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| MetricsError::Encode(e.to_string()))
}
