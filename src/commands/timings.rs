//! Timings command implementation.
//!
//! Parses a timings file and flattens it into two .dat files (late
//! arrival and execution times) for plotting.

use crate::output::write_timings_data;
use crate::parser::timings::{derive_output_names, parse_timings_file};
use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

/// Arguments for the timings command
#[derive(Debug, Clone)]
pub struct TimingsArgs {
    /// Timings file written by the capture layer
    pub file: PathBuf,

    /// Directory receiving the .dat files (input directory when absent)
    pub output_dir: Option<PathBuf>,
}

/// Execute the timings command
pub fn execute_timings(args: TimingsArgs) -> Result<()> {
    info!("extracting timings from {}", args.file.display());

    let calls = parse_timings_file(&args.file).context("Failed to parse timings file")?;
    info!("parsed timing data for {} call(s)", calls.len());

    let (late_path, exec_path) = derive_output_names(&args.file, args.output_dir.as_deref());
    write_timings_data(&calls, &late_path, &exec_path)
        .context("Failed to write timing .dat files")?;

    println!("-> {}", late_path.display());
    println!("-> {}", exec_path.display());
    Ok(())
}
