//! Frame metrics aggregation and periodic reporting
//!
//! The render loop records per-frame render and draw times into a
//! [`FrameMetrics`]; a [`MetricsReporter`] driven by a [`Ticker`] turns the
//! accumulated window into a [`MetricsReport`](orbis_shared::MetricsReport)
//! every few seconds and resets it.

pub mod cache;
pub mod config;
pub mod error;
pub mod frame_metrics;
pub mod metrics;
pub mod reporter;
pub mod ticker;

pub use cache::{CacheError, CacheUsageGauge, RenderResourceCache};
pub use config::ReporterConfig;
pub use error::MetricsError;
pub use frame_metrics::{FrameMetrics, FrameMetricsSnapshot, FramePhase, FrameTimer};
pub use reporter::{MetricsReporter, ReporterHandle, REPORT_TARGET};
pub use ticker::{ChannelTicker, IntervalTicker, Ticker};
