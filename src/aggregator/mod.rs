//! Aggregation of count records into patterns and statistics.
//!
//! Both consumers take the same record stream independently:
//! - `PatternTable` deduplicates call signatures in discovery order
//! - `StatsAggregator` builds histograms and message-size tallies

pub mod patterns;
pub mod stats;

// Re-export main types and functions
pub use patterns::{degree_signature, CallPattern, PatternTable, Signature};
pub use stats::{bins_from_file, create_bins, Bin, CountStats, Histogram, StatsAggregator};
