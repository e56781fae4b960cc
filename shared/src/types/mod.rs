//! Data types produced by the frame metrics reporter

pub mod report;
pub mod session;
