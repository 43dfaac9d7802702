//! Plain-text report writers.
//!
//! One analysis produces three files under the output directory: the
//! statistics summary, the full pattern list, and the fan-out patterns
//! summary. Histograms are enumerated in ascending key order, so two runs
//! over the same data produce byte-identical reports.

use crate::aggregator::patterns::{CallPattern, PatternTable};
use crate::aggregator::stats::{Bin, CountStats};
use crate::grouping::Group;
use crate::notation;
use crate::parser::timings::CallTimings;
use crate::utils::config::{patterns_file_name, patterns_summary_file_name, stats_file_name};
use crate::utils::error::ReportError;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Paths of the files one analysis writes
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub stats: PathBuf,
    pub patterns: PathBuf,
    pub patterns_summary: PathBuf,
}

/// Write the statistics, patterns and patterns-summary files
///
/// **Public** - main entry point for report output
///
/// # Returns
/// The paths of the three files written.
///
/// # Errors
/// * `ReportError::WriteFailed` - I/O error during write
/// * `ReportError::InvalidPath` - output directory cannot be used
pub fn write_reports(
    dir: &Path,
    job_id: u32,
    rank: u32,
    stats: &CountStats,
    size_threshold: u64,
    patterns: &PatternTable,
    groups: &[Group],
    bins: Option<&[Bin]>,
) -> Result<ReportPaths, ReportError> {
    ensure_output_dir(dir)?;

    let paths = ReportPaths {
        stats: dir.join(stats_file_name(job_id, rank)),
        patterns: dir.join(patterns_file_name(job_id, rank)),
        patterns_summary: dir.join(patterns_summary_file_name(job_id, rank)),
    };

    let mut stats_out = BufWriter::new(File::create(&paths.stats)?);
    write_stats_file(&mut stats_out, stats, size_threshold, groups, bins)?;
    stats_out.flush()?;

    let mut patterns_out = BufWriter::new(File::create(&paths.patterns)?);
    writeln!(patterns_out, "# Patterns")?;
    for (num, pattern) in patterns.patterns().iter().enumerate() {
        write_pattern(&mut patterns_out, num, pattern)?;
    }
    patterns_out.flush()?;

    let mut summary_out = BufWriter::new(File::create(&paths.patterns_summary)?);
    writeln!(summary_out, "# Patterns summary")?;
    for (num, pattern) in patterns.fan_out_patterns().enumerate() {
        write_pattern(&mut summary_out, num, pattern)?;
    }
    summary_out.flush()?;

    info!("results are saved in:");
    info!("-> {}", paths.stats.display());
    info!("-> {}", paths.patterns.display());
    info!("patterns summary: {}", paths.patterns_summary.display());

    Ok(paths)
}

fn ensure_output_dir(dir: &Path) -> Result<(), ReportError> {
    if dir.as_os_str().is_empty() {
        return Err(ReportError::InvalidPath("output path is empty".to_string()));
    }
    if dir.exists() && !dir.is_dir() {
        return Err(ReportError::InvalidPath(format!(
            "output path is not a directory: {}",
            dir.display()
        )));
    }
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_stats_file<W: Write>(
    w: &mut W,
    stats: &CountStats,
    size_threshold: u64,
    groups: &[Group],
    bins: Option<&[Bin]>,
) -> Result<(), ReportError> {
    let num_calls = stats.num_calls;
    writeln!(w, "Total number of alltoallv calls: {}\n", num_calls)?;

    writeln!(w, "# Datatypes\n")?;
    for (size, n) in &stats.datatypes_send {
        writeln!(
            w,
            "{}/{} calls use a datatype of size {} while sending data",
            n, num_calls, size
        )?;
    }
    for (size, n) in &stats.datatypes_recv {
        writeln!(
            w,
            "{}/{} calls use a datatype of size {} while receiving data",
            n, num_calls, size
        )?;
    }
    writeln!(w)?;

    writeln!(w, "# Communicator size(s)\n")?;
    for (size, n) in &stats.comm_sizes {
        writeln!(w, "{}/{} calls use a communicator size of {}", n, num_calls, size)?;
    }
    writeln!(w)?;

    writeln!(w, "# Message sizes\n")?;
    let total = stats.total_send_msgs();
    writeln!(
        w,
        "{}/{} of all messages are large (threshold = {})",
        stats.num_send_large_msgs, total, size_threshold
    )?;
    writeln!(
        w,
        "{}/{} of all messages are small (threshold = {})",
        stats.num_send_small_msgs, total, size_threshold
    )?;
    writeln!(
        w,
        "{}/{} of all messages are small, but not 0-size (threshold = {})",
        stats.num_send_small_not_zero_msgs, total, size_threshold
    )?;

    if let Some(bins) = bins {
        writeln!(w, "\n# Message size distribution\n")?;
        for bin in bins {
            match bin.max {
                Some(max) => writeln!(
                    w,
                    "{} message(s) between {} and {} bytes",
                    bin.size, bin.min, max
                )?,
                None => writeln!(w, "{} message(s) of at least {} bytes", bin.size, bin.min)?,
            }
        }
    }

    writeln!(w, "\n# Sparsity\n")?;
    for (zeros, n) in &stats.call_send_sparsity {
        writeln!(
            w,
            "{}/{} of all calls have {} send counts equals to zero",
            n, num_calls, zeros
        )?;
    }
    for (zeros, n) in &stats.call_recv_sparsity {
        writeln!(
            w,
            "{}/{} of all calls have {} recv counts equals to zero",
            n, num_calls, zeros
        )?;
    }

    writeln!(w, "\n# Min/max")?;
    for (min, n) in &stats.send_mins {
        writeln!(w, "{}/{} calls have a send count min of {}", n, num_calls, min)?;
    }
    for (min, n) in &stats.recv_mins {
        writeln!(w, "{}/{} calls have a recv count min of {}", n, num_calls, min)?;
    }
    for (min, n) in &stats.send_not_zero_mins {
        writeln!(
            w,
            "{}/{} calls have a send count min of {} (excluding zero)",
            n, num_calls, min
        )?;
    }
    for (min, n) in &stats.recv_not_zero_mins {
        writeln!(
            w,
            "{}/{} calls have a recv count min of {} (excluding zero)",
            n, num_calls, min
        )?;
    }
    for (max, n) in &stats.send_maxs {
        writeln!(w, "{}/{} calls have a send count max of {}", n, num_calls, max)?;
    }
    for (max, n) in &stats.recv_maxs {
        writeln!(w, "{}/{} calls have a recv count max of {}", n, num_calls, max)?;
    }

    writeln!(w, "\n# Grouping based on the total amount per ranks\n")?;
    write_groups(w, groups)?;

    Ok(())
}

/// Render the volume groups the way the capture layer logs live groups
fn write_groups<W: Write>(w: &mut W, groups: &[Group]) -> Result<(), ReportError> {
    writeln!(w, "Number of groups: {}\n", groups.len())?;
    for (num, group) in groups.iter().enumerate() {
        writeln!(w, "#### Group {}", num)?;
        writeln!(w, "Number of ranks: {}", group.size())?;
        writeln!(w, "Smaller data size: {}", group.min)?;
        writeln!(w, "Bigger data size: {}", group.max)?;
        let members: Vec<String> = group.members.iter().map(|m| m.to_string()).collect();
        writeln!(w, "Ranks: {}", members.join(" "))?;
    }
    Ok(())
}

/// Render one pattern entry
fn write_pattern<W: Write>(w: &mut W, num: usize, pattern: &CallPattern) -> Result<(), ReportError> {
    writeln!(w, "## Pattern #{} ({} alltoallv calls)", num, pattern.count)?;
    writeln!(w, "Alltoallv calls: {}", notation::compress(&pattern.calls)?)?;

    for (sent_to, n) in &pattern.send {
        writeln!(w, "{} ranks sent to {} other ranks", n, sent_to)?;
    }
    for (recv_from, n) in &pattern.recv {
        writeln!(w, "{} ranks recv'd from {} other ranks", n, recv_from)?;
    }
    writeln!(w)?;
    Ok(())
}

/// Write the flattened timing .dat files (late arrival, then execution)
///
/// Each output holds one `call<TAB>rank<TAB>seconds` row per rank per call.
pub fn write_timings_data(
    calls: &[CallTimings],
    late_path: &Path,
    exec_path: &Path,
) -> Result<(), ReportError> {
    let mut late = BufWriter::new(File::create(late_path)?);
    let mut exec = BufWriter::new(File::create(exec_path)?);

    for section in calls {
        for (rank, value) in section.late_arrival.iter().enumerate() {
            writeln!(late, "{}\t{}\t{}", section.call, rank, value)?;
        }
        for (rank, value) in section.execution.iter().enumerate() {
            writeln!(exec, "{}\t{}\t{}", section.call, rank, value)?;
        }
    }

    late.flush()?;
    exec.flush()?;
    info!(
        "timings extracted to {} and {}",
        late_path.display(),
        exec_path.display()
    );
    Ok(())
}
