//! Memory command implementation

use anyhow::Result;
use clap::Args;
use orbis_shared::utils::format_kb;
use orbis_shared::MemoryUsage;

use crate::output;

#[derive(Args, Debug)]
pub struct MemoryArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: MemoryArgs) -> Result<()> {
    let usage = MemoryUsage::sample();
    if args.json {
        return output::json_line(&usage);
    }

    match usage.system_used_bytes {
        Some(bytes) => output::info(&format!("System memory {} KB", format_kb(bytes))),
        None => output::warning("System memory unavailable on this platform"),
    }
    match usage.process_resident_bytes {
        Some(bytes) => output::info(&format!("Process memory {} KB", format_kb(bytes))),
        None => output::warning("Process memory unavailable on this platform"),
    }
    Ok(())
}
