//! Config command implementation

use anyhow::{Context, Result};
use clap::Args;
use orbis_aggregator::ReporterConfig;
use std::path::PathBuf;

use crate::output;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, env = "ORBIS_CONFIG")]
    pub config: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let config =
        ReporterConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    output::json_pretty(&config)
}
