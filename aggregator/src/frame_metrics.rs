//! Per-frame render and draw time accumulation.
//!
//! `FrameMetrics` is a data sink for the render loop and a data source for the
//! periodic reporter. It keeps running sums and counts for render time and draw
//! time; the reporting window is whatever span lies between two `reset` calls.
//! It owns no timers and performs no scheduling.
//!
//! All four accumulators live behind one mutex so a reader never pairs a
//! post-reset sum with a pre-reset count. Critical sections are a handful of
//! integer operations, so the render thread never waits on anything longer.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::cache::RenderResourceCache;

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Consistent copy of the accumulators at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameMetricsSnapshot {
    pub render_time_ns: u64,
    pub render_frames: u64,
    pub draw_time_ns: u64,
    pub draw_frames: u64,
}

impl FrameMetricsSnapshot {
    pub fn render_time_total(&self) -> Duration {
        Duration::from_nanos(self.render_time_ns)
    }

    pub fn draw_time_total(&self) -> Duration {
        Duration::from_nanos(self.draw_time_ns)
    }

    /// Average render time in milliseconds, 0 when no frames were recorded.
    pub fn render_time_average_ms(&self) -> f64 {
        average_ms(self.render_time_ns, self.render_frames)
    }

    /// Average draw time in milliseconds, 0 when no frames were recorded.
    pub fn draw_time_average_ms(&self) -> f64 {
        average_ms(self.draw_time_ns, self.draw_frames)
    }

    pub fn is_empty(&self) -> bool {
        self.render_frames == 0 && self.draw_frames == 0
    }
}

fn average_ms(total_ns: u64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    total_ns as f64 / count as f64 / NANOS_PER_MILLI
}

fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Which half of a frame a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Render,
    Draw,
}

/// Running render/draw time averages plus access to render cache usage.
pub struct FrameMetrics {
    window: Mutex<FrameMetricsSnapshot>,
    cache: Option<Arc<dyn RenderResourceCache>>,
}

impl FrameMetrics {
    /// Metrics with no render cache attached; `cache_used_capacity` reports 0.
    pub fn new() -> Self {
        Self {
            window: Mutex::new(FrameMetricsSnapshot::default()),
            cache: None,
        }
    }

    /// Metrics that report usage of `cache`.
    pub fn with_cache(cache: Arc<dyn RenderResourceCache>) -> Self {
        Self {
            window: Mutex::new(FrameMetricsSnapshot::default()),
            cache: Some(cache),
        }
    }

    // The guarded value is plain integers and is valid even if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, FrameMetricsSnapshot> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add one frame's scene construction time.
    pub fn record_render_time(&self, duration: Duration) {
        let nanos = duration_nanos(duration);
        let mut window = self.lock();
        window.render_time_ns = window.render_time_ns.saturating_add(nanos);
        window.render_frames += 1;
    }

    /// Add one frame's draw submission time.
    pub fn record_draw_time(&self, duration: Duration) {
        let nanos = duration_nanos(duration);
        let mut window = self.lock();
        window.draw_time_ns = window.draw_time_ns.saturating_add(nanos);
        window.draw_frames += 1;
    }

    pub fn record(&self, phase: FramePhase, duration: Duration) {
        match phase {
            FramePhase::Render => self.record_render_time(duration),
            FramePhase::Draw => self.record_draw_time(duration),
        }
    }

    /// Average render time of the current window, in milliseconds.
    pub fn render_time_average(&self) -> f64 {
        self.lock().render_time_average_ms()
    }

    /// Average draw time of the current window, in milliseconds.
    pub fn draw_time_average(&self) -> f64 {
        self.lock().draw_time_average_ms()
    }

    /// Bytes currently used by the render cache, queried now.
    ///
    /// Returns 0 when no cache is attached or the cache cannot answer.
    pub fn cache_used_capacity(&self) -> u64 {
        let Some(cache) = &self.cache else {
            return 0;
        };
        match cache.used_capacity_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("render cache usage unavailable, reporting 0: {}", e);
                0
            }
        }
    }

    pub fn snapshot(&self) -> FrameMetricsSnapshot {
        *self.lock()
    }

    /// Zero all sums and counts. The render cache is left alone.
    pub fn reset(&self) {
        *self.lock() = FrameMetricsSnapshot::default();
    }

    /// Snapshot and reset in one step. A sample racing with this call lands
    /// either in the returned window or in the next one, never both.
    pub fn take_window(&self) -> FrameMetricsSnapshot {
        std::mem::take(&mut *self.lock())
    }

    /// Start timing the render phase of a frame; recorded when the guard drops.
    pub fn time_render(&self) -> FrameTimer<'_> {
        FrameTimer::start(self, FramePhase::Render)
    }

    /// Start timing the draw phase of a frame; recorded when the guard drops.
    pub fn time_draw(&self) -> FrameTimer<'_> {
        FrameTimer::start(self, FramePhase::Draw)
    }
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameMetrics")
            .field("window", &self.snapshot())
            .field("has_cache", &self.cache.is_some())
            .finish()
    }
}

/// Scope guard that records the time it was alive into a `FrameMetrics`.
#[must_use = "the elapsed time is recorded when the timer is dropped"]
pub struct FrameTimer<'a> {
    metrics: &'a FrameMetrics,
    phase: FramePhase,
    started: Instant,
}

impl<'a> FrameTimer<'a> {
    fn start(metrics: &'a FrameMetrics, phase: FramePhase) -> Self {
        Self {
            metrics,
            phase,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for FrameTimer<'_> {
    fn drop(&mut self) {
        self.metrics.record(self.phase, self.started.elapsed());
    }
}
