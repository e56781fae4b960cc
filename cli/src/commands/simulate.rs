//! Simulate command implementation
//!
//! Runs a synthetic render loop on a blocking thread. Each frame records a
//! render and a draw time that wobble around the requested means, and loads or
//! evicts resources from a fake render cache. The reporter runs on its own
//! cadence and every report is printed as it arrives.

use anyhow::{Context, Result};
use clap::Args;
use orbis_aggregator::{CacheUsageGauge, FrameMetrics, MetricsReporter, ReporterConfig};
use orbis_shared::{MetricsReport, SessionInfo};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use crate::output;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// How long to run (e.g., "10s", "1m")
    #[arg(short, long, default_value = "10s")]
    pub duration: String,

    /// Simulated frames per second
    #[arg(long, default_value = "60")]
    pub fps: u32,

    /// Mean render time per frame in milliseconds
    #[arg(long, default_value = "8.0")]
    pub render_ms: f64,

    /// Mean draw time per frame in milliseconds
    #[arg(long, default_value = "3.0")]
    pub draw_ms: f64,

    /// Report interval in milliseconds (overrides the configuration)
    #[arg(short, long)]
    pub interval_ms: Option<u64>,

    /// Render cache capacity in MB
    #[arg(long, default_value = "64")]
    pub cache_mb: u64,

    /// Session label shown in reports
    #[arg(long, default_value = "simulated-globe")]
    pub label: String,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, env = "ORBIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print reports as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Bytes loaded into the fake cache every frame.
const RESOURCE_BYTES_PER_FRAME: u64 = 48 * 1024;

/// Largest accepted mean render or draw time.
const MAX_FRAME_MS: f64 = 60_000.0;

/// Convert a mean frame time in milliseconds, rejecting values that are
/// negative, not finite or longer than `MAX_FRAME_MS`.
fn mean_duration(ms: f64, name: &str) -> Result<Duration> {
    if !ms.is_finite() || ms < 0.0 {
        anyhow::bail!("{} must be a finite, non-negative number of milliseconds", name);
    }
    if ms > MAX_FRAME_MS {
        anyhow::bail!("{} must be at most {} ms", name, MAX_FRAME_MS);
    }
    Duration::try_from_secs_f64(ms / 1000.0).with_context(|| format!("Invalid {}", name))
}

/// Deterministic frame time generator.
#[derive(Debug, Clone)]
struct FrameModel {
    render_mean: Duration,
    draw_mean: Duration,
    frame: u64,
}

impl FrameModel {
    fn new(render_ms: f64, draw_ms: f64) -> Result<Self> {
        Ok(Self {
            render_mean: mean_duration(render_ms, "render time")?,
            draw_mean: mean_duration(draw_ms, "draw time")?,
            frame: 0,
        })
    }

    /// Render and draw time of the next frame, within ±25% of the means.
    fn next_frame(&mut self) -> (Duration, Duration) {
        let t = self.frame as f64;
        self.frame += 1;
        let render_wobble = 1.0 + 0.25 * (t * 0.13).sin();
        let draw_wobble = 1.0 + 0.25 * (t * 0.07).cos();
        (
            self.render_mean.mul_f64(render_wobble),
            self.draw_mean.mul_f64(draw_wobble),
        )
    }
}

/// Load one frame's worth of resources, evicting half the cache when full.
fn churn_cache(cache: &CacheUsageGauge) {
    cache.add(RESOURCE_BYTES_PER_FRAME);
    if cache.capacity() > 0 && cache.used() > cache.capacity() {
        cache.sub(cache.used() / 2);
    }
}

fn print_report(report: &MetricsReport, json: bool) -> Result<()> {
    if json {
        output::json_line(report)
    } else {
        output::info(&format!("#{} {}", report.sequence, report));
        Ok(())
    }
}

pub async fn run(args: SimulateArgs) -> Result<()> {
    let duration = orbis_shared::utils::parse_duration(&args.duration)
        .context("Failed to parse duration")?;
    if args.fps == 0 {
        anyhow::bail!("fps must be greater than 0");
    }
    let mut model = FrameModel::new(args.render_ms, args.draw_ms)?;
    let cache_bytes = args
        .cache_mb
        .checked_mul(1024 * 1024)
        .context("Render cache capacity is too large")?;

    let mut config =
        ReporterConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(interval_ms) = args.interval_ms {
        config.interval_ms = interval_ms;
    }

    let cache = Arc::new(CacheUsageGauge::new(cache_bytes));
    let metrics = Arc::new(FrameMetrics::with_cache(cache.clone()));
    let session = SessionInfo::start(args.label.clone());

    info!(
        "Simulating {} fps for {} ms (render {:.1} ms, draw {:.1} ms)",
        args.fps,
        duration.as_millis(),
        args.render_ms,
        args.draw_ms
    );

    let reporter = MetricsReporter::new(metrics.clone(), config, session)
        .context("Invalid reporter configuration")?;
    let handle = reporter.spawn_interval();

    let mut reports = handle.subscribe();
    let json = args.json;
    let printer = tokio::spawn(async move {
        loop {
            match reports.recv().await {
                Ok(report) => print_report(&report, json)?,
                Err(RecvError::Lagged(skipped)) => debug!("printer lagged by {} reports", skipped),
                Err(RecvError::Closed) => break,
            }
        }
        anyhow::Ok(())
    });

    let running = Arc::new(AtomicBool::new(true));
    let render_loop = {
        let running = running.clone();
        let metrics = metrics.clone();
        let frame_period = Duration::from_secs_f64(1.0 / args.fps as f64);
        tokio::task::spawn_blocking(move || {
            let mut frames = 0u64;
            while running.load(Ordering::Relaxed) {
                let (render, draw) = model.next_frame();
                metrics.record_render_time(render);
                metrics.record_draw_time(draw);
                churn_cache(&cache);
                frames += 1;
                std::thread::sleep(frame_period);
            }
            frames
        })
    };

    tokio::time::sleep(duration).await;
    running.store(false, Ordering::Relaxed);
    let frames = render_loop.await.context("Render loop panicked")?;

    // Flush whatever accumulated since the last scheduled report.
    handle.report_now().context("Final report failed")?;
    handle.shutdown().await;
    printer.await.context("Report printer panicked")??;

    output::success(&format!("Simulated {} frames", frames));
    Ok(())
}
