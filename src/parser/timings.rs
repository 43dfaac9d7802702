//! Parser for per-call timing files.
//!
//! The capture layer appends one section per call:
//!
//! ```text
//! Alltoallv call #0
//! # Late arrival timings
//! Rank 0: 0.000013
//! ...
//! # Execution times of Alltoallv function
//! Rank 0: 0.000104
//! ...
//! ```
//!
//! Sections parse into per-rank vectors; the extraction command flattens
//! them into plottable .dat files.

use crate::utils::error::ReadError;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const CALL_MARKER: &str = "Alltoallv call #";
const LATE_ARRIVAL_MARKER: &str = "# Late arrival timings";
const EXECUTION_MARKER: &str = "# Execution times of Alltoallv function";

/// Timing data of one call: seconds per rank, rank order
#[derive(Debug, Clone, PartialEq)]
pub struct CallTimings {
    pub call: u32,
    pub late_arrival: Vec<f64>,
    pub execution: Vec<f64>,
}

/// Parse a timings file into its per-call sections
pub fn parse_timings_file(path: &Path) -> Result<Vec<CallTimings>, ReadError> {
    let file = File::open(path).map_err(|e| ReadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_timings(BufReader::new(file), &path.display().to_string())
}

/// Parse timing sections from any buffered reader
pub fn parse_timings<R: BufRead>(reader: R, label: &str) -> Result<Vec<CallTimings>, ReadError> {
    let mut calls: Vec<CallTimings> = Vec::new();
    // Which list of the current section the next "Rank" line feeds
    let mut in_execution = false;

    for line in reader.lines() {
        let line = line.map_err(|e| ReadError::Io {
            path: label.to_string(),
            source: e,
        })?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        if let Some(num) = line.strip_prefix(CALL_MARKER) {
            let call: u32 = num.trim().parse().map_err(|_| ReadError::MalformedHeader {
                path: label.to_string(),
                reason: format!("invalid call number '{}'", num),
            })?;
            calls.push(CallTimings {
                call,
                late_arrival: Vec::new(),
                execution: Vec::new(),
            });
            in_execution = false;
            continue;
        }

        let current = calls.last_mut().ok_or_else(|| ReadError::MalformedHeader {
            path: label.to_string(),
            reason: format!("'{}' before any call section", line),
        })?;

        if line == LATE_ARRIVAL_MARKER {
            in_execution = false;
        } else if line == EXECUTION_MARKER {
            in_execution = true;
        } else if let Some(rest) = line.strip_prefix("Rank ") {
            let (rank_str, value_str) =
                rest.split_once(": ").ok_or_else(|| malformed(label, current.call, line))?;
            let rank: usize = rank_str
                .parse()
                .map_err(|_| malformed(label, current.call, line))?;
            let value: f64 = value_str
                .trim()
                .parse()
                .map_err(|_| malformed(label, current.call, line))?;

            let values = if in_execution {
                &mut current.execution
            } else {
                &mut current.late_arrival
            };
            // The capture layer writes ranks in order; a gap means the file was edited
            if rank != values.len() {
                return Err(malformed(label, current.call, line));
            }
            values.push(value);
        } else {
            return Err(malformed(label, current.call, line));
        }
    }

    for section in &calls {
        if section.late_arrival.len() != section.execution.len() {
            return Err(ReadError::MalformedBlock {
                path: label.to_string(),
                first: section.call,
                last: section.call,
                reason: format!(
                    "{} late-arrival value(s) but {} execution value(s)",
                    section.late_arrival.len(),
                    section.execution.len()
                ),
            });
        }
    }

    debug!("{}: parsed timings for {} call(s)", label, calls.len());
    Ok(calls)
}

fn malformed(label: &str, call: u32, line: &str) -> ReadError {
    ReadError::MalformedBlock {
        path: label.to_string(),
        first: call,
        last: call,
        reason: format!("malformed timing line '{}'", line),
    }
}

/// Derive the .dat output paths from the timings file name
///
/// `timings` becomes `late_arrival_timings` / `alltoallv_timings` and the
/// `.md` extension becomes `.dat`.
pub fn derive_output_names(input: &Path, output_dir: Option<&Path>) -> (PathBuf, PathBuf) {
    let base = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let late = base
        .replace("timings", "late_arrival_timings")
        .replace(".md", ".dat");
    let exec = base
        .replace("timings", "alltoallv_timings")
        .replace(".md", ".dat");

    match output_dir {
        Some(dir) => (dir.join(late), dir.join(exec)),
        None => (PathBuf::from(late), PathBuf::from(exec)),
    }
}
