//! Checking derived counters against independently captured data.
//!
//! During an instrumented run the capture layer randomly samples calls and
//! writes the raw counters of one rank to
//! `validation_data-pid<id>-rank<rank>-call<call>.txt` (two lines: send
//! then recv). Comparing those literal strings against what the counts
//! reader derives for the same (rank, call) catches both capture and
//! parsing regressions.

use crate::parser::counts::find_rank_call_counters;
use crate::utils::config::VALIDATION_DATA_PREFIX;
use crate::utils::error::ValidationError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Coordinates encoded in a validation file's name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationFileInfo {
    pub pid: u32,
    pub rank: u32,
    pub call: u32,
}

/// Parse `validation_data-pid<id>-rank<rank>-call<call>.txt`
pub fn info_from_filename(path: &Path) -> Result<ValidationFileInfo, ValidationError> {
    let bad = || ValidationError::BadFilename(path.display().to_string());

    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(bad)?;
    let trimmed = name
        .strip_prefix(VALIDATION_DATA_PREFIX)
        .and_then(|n| n.strip_suffix(".txt"))
        .ok_or_else(bad)?;

    let tokens: Vec<&str> = trimmed.split('-').collect();
    if tokens.len() != 3 {
        return Err(bad());
    }

    let pid = tokens[0].strip_prefix("pid").ok_or_else(bad)?;
    let rank = tokens[1].strip_prefix("rank").ok_or_else(bad)?;
    let call = tokens[2].strip_prefix("call").ok_or_else(bad)?;

    Ok(ValidationFileInfo {
        pid: pid.parse().map_err(|_| bad())?,
        rank: rank.parse().map_err(|_| bad())?,
        call: call.parse().map_err(|_| bad())?,
    })
}

/// Find every validation file a given pid wrote under a directory
///
/// Returned sorted by name so batches process deterministically.
pub fn validation_files(dir: &Path, pid: u32) -> Result<Vec<PathBuf>, ValidationError> {
    let prefix = format!("{}pid{}-", VALIDATION_DATA_PREFIX, pid);
    let mut files = Vec::new();

    let listing = std::fs::read_dir(dir).map_err(|e| ValidationError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;
    for entry in listing {
        let entry = entry.map_err(|e| ValidationError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        if entry
            .file_name()
            .to_string_lossy()
            .starts_with(&prefix)
        {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

/// Load the send and recv counter lines from one validation file
///
/// The file holds exactly two non-empty lines; trailing whitespace is
/// not significant.
pub fn counters_from_file(path: &Path) -> Result<(String, String), ValidationError> {
    let file = File::open(path).map_err(|e| ValidationError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut send: Option<String> = None;
    let mut recv: Option<String> = None;

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| ValidationError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if send.is_none() {
            send = Some(line.to_string());
        } else if recv.is_none() {
            recv = Some(line.to_string());
        } else {
            return Err(ValidationError::BadContents {
                file: path.display().to_string(),
            });
        }
    }

    match (send, recv) {
        (Some(send), Some(recv)) => Ok((send, recv)),
        _ => Err(ValidationError::BadContents {
            file: path.display().to_string(),
        }),
    }
}

/// Check one validation file against the job's counts files
pub fn validate_file(dir: &Path, job_id: u32, path: &Path) -> Result<(), ValidationError> {
    let info = info_from_filename(path)?;
    debug!(
        "looking up counters for rank {} during call {}",
        info.rank, info.call
    );

    let (expected_send, expected_recv) = counters_from_file(path)?;
    let (actual_send, actual_recv) = find_rank_call_counters(dir, job_id, info.rank, info.call)?;

    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    if expected_send != actual_send {
        return Err(ValidationError::SendMismatch {
            file,
            expected: expected_send,
            actual: actual_send,
        });
    }
    if expected_recv != actual_recv {
        return Err(ValidationError::RecvMismatch {
            file,
            expected: expected_recv,
            actual: actual_recv,
        });
    }
    Ok(())
}

/// Validate every sampled call of one job; stops at the first mismatch
///
/// Returns the number of files checked.
pub fn validate_job(dir: &Path, job_id: u32, pid: u32) -> Result<usize, ValidationError> {
    let files = validation_files(dir, pid)?;
    info!("found {} file(s) with data for validation", files.len());

    for file in &files {
        validate_file(dir, job_id, file)?;
        info!("file {} validated", file.display());
    }

    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_from_filename() {
        let info = info_from_filename(Path::new("validation_data-pid1234-rank3-call7.txt")).unwrap();
        assert_eq!(
            info,
            ValidationFileInfo {
                pid: 1234,
                rank: 3,
                call: 7
            }
        );
    }

    #[test]
    fn test_info_from_filename_rejects_wrong_shape() {
        assert!(info_from_filename(Path::new("validation_data-rank3-call7.txt")).is_err());
        assert!(info_from_filename(Path::new("validation_data-pid1-rank2.txt")).is_err());
        assert!(info_from_filename(Path::new("somethingelse-pid1-rank2-call3.txt")).is_err());
        assert!(info_from_filename(Path::new("validation_data-pidX-rank2-call3.txt")).is_err());
    }
}
