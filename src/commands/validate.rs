//! Validate command implementation.
//!
//! Compares every validation-data file a pid wrote against the counters
//! the reader derives from the job's counts files. Any mismatch aborts
//! with both strings and the offending file name.

use crate::validation::validate_job;
use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Clone)]
pub struct ValidateArgs {
    /// Directory holding the counts and validation files
    pub dir: PathBuf,

    /// Job whose counts files are checked
    pub job_id: u32,

    /// Pid of the capture process that wrote the validation files
    pub pid: u32,
}

/// Execute the validate command
pub fn execute_validate(args: ValidateArgs) -> Result<()> {
    info!(
        "validating job {} (pid {}) under {}",
        args.job_id,
        args.pid,
        args.dir.display()
    );

    let checked = validate_job(&args.dir, args.job_id, args.pid)
        .context("Validation failed")?;

    println!("{} validation file(s) checked, all matching", checked);
    Ok(())
}
