//! Periodic frame metrics reporter.
//!
//! The reporter is the driver side of `FrameMetrics`: on every tick it takes
//! the current window, samples memory and render cache usage, logs the summary
//! line, updates the Prometheus series and publishes the report to
//! subscribers. Cadence comes from an injected `Ticker`.
//!
//! `MetricsReporter::report` can also be called directly from a cooperative
//! loop that has no tokio runtime. Reports are serialized, so subscribers see
//! sequence numbers in increasing order even when a manual report races a
//! scheduled one.

use chrono::Utc;
use orbis_shared::{MemoryUsage, MetricsReport, SessionInfo};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ReporterConfig;
use crate::error::{MetricsError, Result};
use crate::frame_metrics::{FrameMetrics, FrameMetricsSnapshot};
use crate::metrics;
use crate::ticker::{IntervalTicker, Ticker};

/// Tracing target for report lines, so they can be filtered on their own.
pub const REPORT_TARGET: &str = "orbis::frame_metrics";

/// Frame counts already exported to Prometheus. Held for the whole of
/// `report()`, which also orders sequence numbers.
#[derive(Debug, Default)]
struct Exported {
    render_frames: u64,
    draw_frames: u64,
}

impl Exported {
    /// Frames in `window` that have not been exported yet.
    ///
    /// A reset window only holds new frames. A cumulative window also holds
    /// every frame exported before, unless the metrics were reset externally,
    /// in which case the count restarts from zero.
    fn advance(&mut self, window: &FrameMetricsSnapshot, reset: bool) -> (u64, u64) {
        if reset {
            return (window.render_frames, window.draw_frames);
        }
        let render = if window.render_frames >= self.render_frames {
            window.render_frames - self.render_frames
        } else {
            window.render_frames
        };
        let draw = if window.draw_frames >= self.draw_frames {
            window.draw_frames - self.draw_frames
        } else {
            window.draw_frames
        };
        self.render_frames = window.render_frames;
        self.draw_frames = window.draw_frames;
        (render, draw)
    }
}

pub struct MetricsReporter {
    metrics: Arc<FrameMetrics>,
    config: ReporterConfig,
    session: SessionInfo,
    sequence: AtomicU64,
    paused: AtomicBool,
    resumed: Notify,
    exported: Mutex<Exported>,
    reports: broadcast::Sender<MetricsReport>,
}

impl MetricsReporter {
    pub fn new(
        metrics: Arc<FrameMetrics>,
        config: ReporterConfig,
        session: SessionInfo,
    ) -> Result<Self> {
        config.validate()?;
        let (reports, _) = broadcast::channel(config.channel_capacity);
        Ok(Self {
            metrics,
            config,
            session,
            sequence: AtomicU64::new(0),
            paused: AtomicBool::new(false),
            resumed: Notify::new(),
            exported: Mutex::new(Exported::default()),
            reports,
        })
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionInfo {
        &self.session
    }

    /// Receive every report produced from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<MetricsReport> {
        self.reports.subscribe()
    }

    pub fn pause(&self) {
        if !self.paused.swap(true, Ordering::SeqCst) {
            info!(target: REPORT_TARGET, session = %self.session.label, "reporting paused");
        }
    }

    /// Resume reporting. Samples recorded while paused are included in the
    /// next report, which a spawned reporter produces one full interval after
    /// this call.
    pub fn resume(&self) {
        if self.paused.swap(false, Ordering::SeqCst) {
            info!(target: REPORT_TARGET, session = %self.session.label, "reporting resumed");
            self.resumed.notify_one();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Number of reports produced so far.
    pub fn reports_produced(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Assemble, log and publish one report now, regardless of pause state.
    pub fn report(&self) -> MetricsReport {
        let mut exported = self.exported.lock().unwrap_or_else(PoisonError::into_inner);

        let window = if self.config.reset_after_report {
            self.metrics.take_window()
        } else {
            self.metrics.snapshot()
        };
        let render_cache_bytes = self.metrics.cache_used_capacity();
        let memory = if self.config.include_memory {
            MemoryUsage::sample()
        } else {
            MemoryUsage::default()
        };
        let reported_at = Utc::now();

        let report = MetricsReport {
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst) + 1,
            session: self.session.label.clone(),
            reported_at,
            session_uptime_ms: self.session.uptime_millis(reported_at),
            memory,
            render_cache_bytes,
            render_time_avg_ms: window.render_time_average_ms(),
            draw_time_avg_ms: window.draw_time_average_ms(),
            render_frames: window.render_frames,
            draw_frames: window.draw_frames,
        };

        info!(
            target: REPORT_TARGET,
            sequence = report.sequence,
            session = %report.session,
            render_frames = report.render_frames,
            draw_frames = report.draw_frames,
            render_cache_bytes = report.render_cache_bytes,
            "{}",
            report
        );
        let (new_render, new_draw) = exported.advance(&window, self.config.reset_after_report);
        metrics::observe_report(&report, new_render, new_draw);

        // Having no subscribers is normal.
        let _ = self.reports.send(report.clone());
        report
    }

    /// Run the reporter on the current tokio runtime, ticking on `ticker`.
    pub fn spawn<T>(self, ticker: T) -> ReporterHandle
    where
        T: Ticker + 'static,
    {
        let reporter = Arc::new(self);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(reporter.clone(), ticker, cancel.clone()));
        ReporterHandle {
            reporter,
            cancel,
            task,
        }
    }

    /// Run the reporter on a fixed interval taken from the configuration.
    pub fn spawn_interval(self) -> ReporterHandle {
        let ticker = IntervalTicker::new(self.config.interval());
        self.spawn(ticker)
    }
}

async fn run<T: Ticker>(reporter: Arc<MetricsReporter>, mut ticker: T, cancel: CancellationToken) {
    info!(
        target: REPORT_TARGET,
        session = %reporter.session.label,
        interval_ms = reporter.config.interval_ms,
        reset_after_report = reporter.config.reset_after_report,
        "frame metrics reporter started"
    );

    loop {
        let ticked = tokio::select! {
            _ = cancel.cancelled() => break,
            _ = reporter.resumed.notified() => None,
            ticked = ticker.tick() => Some(ticked),
        };
        let Some(ticked) = ticked else {
            // Start a fresh period so the first report after resume covers
            // a full interval.
            ticker.restart();
            continue;
        };
        if !ticked {
            debug!("ticker exhausted, stopping reporter");
            break;
        }
        if reporter.is_paused() {
            debug!("reporter paused, skipping tick");
            continue;
        }
        reporter.report();
    }

    info!(
        target: REPORT_TARGET,
        session = %reporter.session.label,
        reports = reporter.reports_produced(),
        "frame metrics reporter stopped"
    );
}

/// Control handle for a spawned reporter.
pub struct ReporterHandle {
    reporter: Arc<MetricsReporter>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ReporterHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<MetricsReport> {
        self.reporter.subscribe()
    }

    pub fn pause(&self) {
        self.reporter.pause();
    }

    pub fn resume(&self) {
        self.reporter.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.reporter.is_paused()
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }

    /// Produce a report immediately, outside the regular cadence.
    pub fn report_now(&self) -> Result<MetricsReport> {
        if !self.is_running() {
            return Err(MetricsError::ReporterStopped);
        }
        Ok(self.reporter.report())
    }

    /// Stop the reporter and wait for its task to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!("frame metrics reporter task failed: {}", e);
        }
    }
}
