//! Parsing of the persisted profiling data.
//!
//! This module handles:
//! - Streaming counts files into blocks and per-call records
//! - Point lookups of one rank's counters during one call
//! - Timing files written alongside the counts

pub mod counts;
pub mod schema;
pub mod timings;

// Re-export main types
pub use counts::{
    call_rank_volumes, find_rank_call_counters, locate_counts_files, CountsReader, RecordStream,
};
pub use schema::{CountRecord, CountsBlock, RankCounters};
pub use timings::{parse_timings_file, CallTimings};
