//! Output writers for analysis results.
//!
//! This module handles writing data to disk:
//! - Plain-text statistics and pattern reports
//! - Flattened timing .dat files
//! - JSON snapshots

pub mod json;
pub mod report;

// Re-export main functions
pub use json::{write_snapshot, AnalysisSnapshot};
pub use report::{write_reports, write_timings_data, ReportPaths};
