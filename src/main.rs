//! Alltoallv Profiler CLI
//!
//! Postmortem analysis of alltoallv communication profiles.
//! Turns captured counts files into pattern, statistics and grouping reports.

use alltoallv_profiler::commands::{
    execute_analyze, execute_timings, execute_validate, AnalyzeArgs, TimingsArgs, ValidateArgs,
};
use alltoallv_profiler::utils::config::DEFAULT_MSG_SIZE_THRESHOLD;
use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

/// Alltoallv Profiler - postmortem analysis of collective communication
#[derive(Parser, Debug)]
#[command(name = "alltoallv-profile")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a pair of counts files and write reports
    Analyze {
        /// Send-context counts file
        #[arg(long)]
        send_counts: PathBuf,

        /// Receive-context counts file
        #[arg(long)]
        recv_counts: PathBuf,

        /// Output directory for the report files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Job id used in report file names
        #[arg(short, long, default_value = "0")]
        job_id: u32,

        /// Rank that captured the counts
        #[arg(short, long, default_value = "0")]
        rank: u32,

        /// Small/large message boundary in bytes
        #[arg(long, default_value_t = DEFAULT_MSG_SIZE_THRESHOLD)]
        size_threshold: u64,

        /// Ascending byte thresholds for a message-size distribution
        #[arg(long, value_delimiter = ',')]
        bins: Vec<u64>,

        /// Also write a JSON snapshot to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Check counts files against captured validation data
    Validate {
        /// Directory holding the counts and validation files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Job whose counts files are checked
        #[arg(short, long, default_value = "0")]
        job_id: u32,

        /// Pid of the capture process
        #[arg(short, long)]
        pid: u32,
    },

    /// Extract plottable .dat files from a timings file
    Timings {
        /// Timings file written by the capture layer
        #[arg(short, long)]
        file: PathBuf,

        /// Output directory for the .dat files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            send_counts,
            recv_counts,
            output_dir,
            job_id,
            rank,
            size_threshold,
            bins,
            json,
        } => {
            execute_analyze(AnalyzeArgs {
                send_counts,
                recv_counts,
                output_dir,
                job_id,
                rank,
                size_threshold,
                bins,
                json,
            })?;
        }

        Commands::Validate { dir, job_id, pid } => {
            execute_validate(ValidateArgs { dir, job_id, pid })?;
        }

        Commands::Timings { file, output_dir } => {
            execute_timings(TimingsArgs { file, output_dir })?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display version information
fn display_version() {
    println!("Alltoallv Profiler v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Postmortem analysis of alltoallv communication profiles.");
}
