//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Streams the send/recv counts files into per-call records
//! 2. Classifies every call into the pattern table
//! 3. Accumulates statistics and per-rank send volumes
//! 4. Groups ranks by total sent bytes
//! 5. Writes the report files (and optionally a JSON snapshot)

use crate::aggregator::{PatternTable, StatsAggregator};
use crate::aggregator::stats::bins_from_file;
use crate::grouping::GroupingEngine;
use crate::output::{write_reports, write_snapshot, AnalysisSnapshot};
use crate::parser::RecordStream;
use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Arguments for the analyze command
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Send-context counts file
    pub send_counts: PathBuf,

    /// Receive-context counts file
    pub recv_counts: PathBuf,

    /// Directory receiving the report files
    pub output_dir: PathBuf,

    /// Job the counts belong to (used in report file names)
    pub job_id: u32,

    /// Rank that captured the counts (used in report file names)
    pub rank: u32,

    /// Small/large message boundary in bytes
    pub size_threshold: u64,

    /// Ascending byte thresholds for the size distribution; empty = skip
    pub bins: Vec<u64>,

    /// Optional JSON snapshot path
    pub json: Option<PathBuf>,
}

/// Execute the analyze command
pub fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    info!("analyzing counts for job {}", args.job_id);
    info!("send counts: {}", args.send_counts.display());
    info!("recv counts: {}", args.recv_counts.display());

    // Step 1: stream records out of the two counts files
    info!("Step 1/4: Parsing counts files...");
    let stream = RecordStream::open(&args.send_counts, &args.recv_counts)
        .context("Failed to open counts files")?;

    let mut patterns = PatternTable::new();
    let mut aggregator = StatsAggregator::new(args.size_threshold);
    let mut send_volumes: BTreeMap<u32, u64> = BTreeMap::new();
    let mut num_records = 0u64;

    for record in stream {
        let record = record.context("Failed to parse counts files")?;

        // Step 2 and 3 run off the same record
        patterns.classify(&record);
        aggregator.accumulate(&record);

        for entry in &record.send_counters {
            let volume = entry.total() * record.send_datatype_size;
            for &rank in &entry.ranks {
                *send_volumes.entry(rank).or_insert(0) += volume;
            }
        }
        num_records += 1;
    }
    info!(
        "processed {} call(s), {} distinct pattern(s)",
        num_records,
        patterns.len()
    );

    // Step 2: group ranks by their total sent volume, in rank order
    info!("Step 2/4: Grouping ranks by send volume...");
    let mut engine = GroupingEngine::new();
    for (&rank, &volume) in &send_volumes {
        engine.add(rank, volume);
    }
    let groups = engine.finalize();
    debug!("{} volume group(s)", groups.len());

    // Step 3: optional message-size distribution over the send file
    let bins = if args.bins.is_empty() {
        None
    } else {
        info!("Step 3/4: Binning message sizes...");
        Some(
            bins_from_file(&args.send_counts, &args.bins)
                .context("Failed to bin message sizes")?,
        )
    };

    // Step 4: write the reports
    info!("Step 4/4: Writing reports...");
    let stats = aggregator.into_stats();
    write_reports(
        &args.output_dir,
        args.job_id,
        args.rank,
        &stats,
        args.size_threshold,
        &patterns,
        &groups,
        bins.as_deref(),
    )
    .context("Failed to write report files")?;

    if let Some(json_path) = &args.json {
        let snapshot = AnalysisSnapshot::new(
            args.job_id,
            args.rank,
            args.size_threshold,
            stats,
            patterns.patterns().to_vec(),
            groups,
        );
        write_snapshot(&snapshot, json_path).context("Failed to write JSON snapshot")?;
    }

    info!("analysis complete");
    Ok(())
}
