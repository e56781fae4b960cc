//! Reporter behaviour against a live tokio runtime.
//!
//! Ticks are driven either by hand through a `ChannelTicker` or by an
//! `IntervalTicker` under paused tokio time.

use orbis_aggregator::{
    CacheUsageGauge, ChannelTicker, FrameMetrics, MetricsError, MetricsReporter, ReporterConfig,
};
use orbis_shared::SessionInfo;
use std::sync::Arc;
use std::time::Duration;

fn quiet_config() -> ReporterConfig {
    ReporterConfig {
        include_memory: false,
        ..Default::default()
    }
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[tokio::test]
async fn reports_once_per_tick_and_resets_window() {
    let gauge = Arc::new(CacheUsageGauge::new(0));
    let metrics = Arc::new(FrameMetrics::with_cache(gauge.clone()));
    let reporter =
        MetricsReporter::new(metrics.clone(), quiet_config(), SessionInfo::start("globe")).unwrap();

    let (tick, ticker) = ChannelTicker::new(4);
    let handle = reporter.spawn(ticker);
    let mut reports = handle.subscribe();

    for v in [10, 20, 30] {
        metrics.record_render_time(ms(v));
    }
    metrics.record_draw_time(ms(2));
    metrics.record_draw_time(ms(4));
    gauge.set(1024);
    tick.send(()).await.unwrap();

    let first = reports.recv().await.unwrap();
    assert_eq!(first.sequence, 1);
    assert_eq!(first.session, "globe");
    assert_eq!(first.render_frames, 3);
    assert!((first.render_time_avg_ms - 20.0).abs() < 1e-9);
    assert!((first.draw_time_avg_ms - 3.0).abs() < 1e-9);
    assert_eq!(first.render_cache_bytes, 1024);
    assert_eq!(first.memory.system_used_bytes, None);

    // Window was reset by the first report.
    assert_eq!(metrics.render_time_average(), 0.0);

    metrics.record_render_time(ms(5));
    gauge.set(2048);
    tick.send(()).await.unwrap();

    let second = reports.recv().await.unwrap();
    assert_eq!(second.sequence, 2);
    assert_eq!(second.render_frames, 1);
    assert!((second.render_time_avg_ms - 5.0).abs() < 1e-9);
    assert_eq!(second.draw_time_avg_ms, 0.0);
    assert_eq!(second.render_cache_bytes, 2048);

    handle.shutdown().await;
}

#[tokio::test]
async fn cumulative_mode_keeps_samples() {
    let metrics = Arc::new(FrameMetrics::new());
    let config = ReporterConfig {
        reset_after_report: false,
        ..quiet_config()
    };
    let reporter = MetricsReporter::new(metrics.clone(), config, SessionInfo::default()).unwrap();

    metrics.record_render_time(ms(10));
    let first = reporter.report();
    metrics.record_render_time(ms(20));
    let second = reporter.report();

    assert_eq!(first.render_frames, 1);
    assert_eq!(second.render_frames, 2);
    assert!((second.render_time_avg_ms - 15.0).abs() < 1e-9);
}

#[tokio::test]
async fn paused_reporter_skips_ticks_without_losing_samples() {
    let metrics = Arc::new(FrameMetrics::new());
    let reporter =
        MetricsReporter::new(metrics.clone(), quiet_config(), SessionInfo::default()).unwrap();

    let (tick, ticker) = ChannelTicker::new(4);
    let handle = reporter.spawn(ticker);
    let mut reports = handle.subscribe();

    handle.pause();
    assert!(handle.is_paused());
    metrics.record_render_time(ms(8));
    tick.send(()).await.unwrap();
    // Let the reporter consume the paused tick.
    tokio::time::sleep(ms(20)).await;
    metrics.record_render_time(ms(12));

    handle.resume();
    tick.send(()).await.unwrap();

    let report = reports.recv().await.unwrap();
    assert_eq!(report.sequence, 1);
    assert_eq!(report.render_frames, 2);
    assert!((report.render_time_avg_ms - 10.0).abs() < 1e-9);
    assert!(reports.try_recv().is_err());

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn interval_reporter_follows_configured_cadence() {
    let metrics = Arc::new(FrameMetrics::new());
    let config = ReporterConfig {
        interval_ms: 3000,
        ..quiet_config()
    };
    let reporter = MetricsReporter::new(metrics.clone(), config, SessionInfo::default()).unwrap();
    let handle = reporter.spawn_interval();
    let mut reports = handle.subscribe();

    metrics.record_draw_time(ms(6));
    let start = tokio::time::Instant::now();

    let first = reports.recv().await.unwrap();
    assert!(start.elapsed() >= ms(3000));
    assert_eq!(first.draw_frames, 1);

    let second = reports.recv().await.unwrap();
    assert!(start.elapsed() >= ms(6000));
    assert_eq!(second.sequence, 2);
    assert_eq!(second.draw_frames, 0);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn first_report_after_resume_waits_a_full_interval() {
    let metrics = Arc::new(FrameMetrics::new());
    let config = ReporterConfig {
        interval_ms: 3000,
        ..quiet_config()
    };
    let reporter = MetricsReporter::new(metrics.clone(), config, SessionInfo::default()).unwrap();
    let handle = reporter.spawn_interval();
    let mut reports = handle.subscribe();

    handle.pause();
    // The tick at 3000 ms is skipped; the schedule would next fire at 6000 ms.
    tokio::time::sleep(ms(4500)).await;
    metrics.record_render_time(ms(8));

    let resumed = tokio::time::Instant::now();
    handle.resume();

    let report = reports.recv().await.unwrap();
    assert!(resumed.elapsed() >= ms(3000));
    assert_eq!(report.sequence, 1);
    assert_eq!(report.render_frames, 1);

    handle.shutdown().await;
}

#[test]
fn concurrent_reports_publish_in_sequence_order() {
    let metrics = Arc::new(FrameMetrics::new());
    let config = ReporterConfig {
        channel_capacity: 256,
        ..quiet_config()
    };
    let reporter =
        Arc::new(MetricsReporter::new(metrics.clone(), config, SessionInfo::default()).unwrap());
    let mut reports = reporter.subscribe();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let reporter = reporter.clone();
            let metrics = metrics.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    metrics.record_render_time(ms(1));
                    reporter.report();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let mut last = 0;
    let mut frames = 0;
    while let Ok(report) = reports.try_recv() {
        assert_eq!(report.sequence, last + 1);
        last = report.sequence;
        frames += report.render_frames;
    }
    assert_eq!(last, 100);
    assert_eq!(frames, 100);
}

#[tokio::test]
async fn report_now_fails_after_ticker_is_exhausted() {
    let metrics = Arc::new(FrameMetrics::new());
    let reporter = MetricsReporter::new(metrics, quiet_config(), SessionInfo::default()).unwrap();

    let (tick, ticker) = ChannelTicker::new(1);
    let handle = reporter.spawn(ticker);

    let manual = handle.report_now().unwrap();
    assert_eq!(manual.sequence, 1);

    drop(tick);
    while handle.is_running() {
        tokio::time::sleep(ms(1)).await;
    }
    assert!(matches!(
        handle.report_now(),
        Err(MetricsError::ReporterStopped)
    ));
    handle.shutdown().await;
}

#[test]
fn rejects_invalid_config() {
    let config = ReporterConfig {
        interval_ms: 0,
        ..Default::default()
    };
    let result = MetricsReporter::new(Arc::new(FrameMetrics::new()), config, SessionInfo::default());
    assert!(matches!(result, Err(MetricsError::InvalidConfig(_))));
}
