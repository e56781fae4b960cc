//! CLI for Orbis
//!
//! Commands:
//! - simulate: drive a simulated render loop and print periodic frame metrics
//! - memory: print one system/process memory sample
//! - config: print the effective reporter configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "orbis")]
#[command(about = "Orbis - frame metrics for globe rendering sessions", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulated render loop and report frame metrics periodically
    Simulate(commands::simulate::SimulateArgs),

    /// Print current system and process memory usage
    Memory(commands::memory::MemoryArgs),

    /// Print the effective reporter configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Simulate(args) => commands::simulate::run(args).await,
        Commands::Memory(args) => commands::memory::run(args),
        Commands::Config(args) => commands::config::run(args),
    };

    if let Err(e) = result {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
