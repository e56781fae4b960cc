//! Error types for the aggregator crate

use thiserror::Error;

/// Errors surfaced by reporter setup and metrics export.
///
/// Recording and reading frame metrics never fails; these cover the
/// surrounding plumbing only.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("reporter has stopped")]
    ReporterStopped,

    #[error("failed to encode metrics: {0}")]
    Encode(String),
}

pub type Result<T, E = MetricsError> = std::result::Result<T, E>;
