//! Shared types and utilities for Orbis
//!
//! This crate contains the report and session data structures produced by the
//! frame metrics reporter, plus formatting, duration and memory helpers used
//! by the aggregator and the CLI.

pub mod types;
pub mod utils;

// Re-export commonly used types
pub use types::{report::*, session::*};
pub use utils::memory::MemoryUsage;
