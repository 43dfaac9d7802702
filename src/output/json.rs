//! JSON snapshot export.
//!
//! Serializes a complete analysis (statistics, patterns, volume groups)
//! to pretty JSON for downstream tooling.

use crate::aggregator::patterns::CallPattern;
use crate::aggregator::stats::CountStats;
use crate::grouping::Group;
use crate::utils::error::ReportError;
use chrono::Utc;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Machine-readable result of one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSnapshot {
    pub job_id: u32,
    pub rank: u32,
    pub size_threshold: u64,
    pub stats: CountStats,
    pub patterns: Vec<CallPattern>,
    pub volume_groups: Vec<Group>,
    pub generated_at: String,
}

impl AnalysisSnapshot {
    pub fn new(
        job_id: u32,
        rank: u32,
        size_threshold: u64,
        stats: CountStats,
        patterns: Vec<CallPattern>,
        volume_groups: Vec<Group>,
    ) -> Self {
        Self {
            job_id,
            rank,
            size_threshold,
            stats,
            patterns,
            volume_groups,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Write a snapshot to a JSON file
///
/// # Errors
/// * `ReportError::WriteFailed` - I/O error during write
/// * `ReportError::SerializationFailed` - JSON serialization error
/// * `ReportError::InvalidPath` - path cannot be created or is invalid
pub fn write_snapshot(
    snapshot: &AnalysisSnapshot,
    output_path: impl AsRef<Path>,
) -> Result<(), ReportError> {
    let output_path = output_path.as_ref();

    info!("writing JSON snapshot to: {}", output_path.display());

    if output_path.as_os_str().is_empty() {
        return Err(ReportError::InvalidPath("path is empty".to_string()));
    }
    if output_path.exists() && output_path.is_dir() {
        return Err(ReportError::InvalidPath(format!(
            "path is a directory: {}",
            output_path.display()
        )));
    }

    if let Some(parent) = output_path.parent() {
        if !parent.exists() {
            debug!("creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                ReportError::InvalidPath(format!(
                    "cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(ReportError::WriteFailed)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, snapshot).map_err(ReportError::SerializationFailed)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_snapshot() -> AnalysisSnapshot {
        AnalysisSnapshot::new(
            1,
            0,
            200,
            CountStats::default(),
            Vec::new(),
            vec![Group {
                min: 10,
                max: 12,
                members: vec![0, 1],
            }],
        )
    }

    #[test]
    fn test_write_snapshot() {
        let snapshot = sample_snapshot();
        let temp_file = NamedTempFile::new().unwrap();

        write_snapshot(&snapshot, temp_file.path()).unwrap();

        let text = std::fs::read_to_string(temp_file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["job_id"], 1);
        assert_eq!(value["size_threshold"], 200);
        assert_eq!(value["volume_groups"][0]["min"], 10);
    }

    #[test]
    fn test_write_snapshot_rejects_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = write_snapshot(&sample_snapshot(), temp_dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_write_snapshot_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("nested/dirs/snapshot.json");
        write_snapshot(&sample_snapshot(), &nested).unwrap();
        assert!(nested.exists());
    }
}
