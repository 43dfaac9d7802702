//! Data model for parsed counts files.
//!
//! A counts file is a sequence of blocks, one per communicator
//! configuration the capture layer observed. Each block carries the call
//! indices it covers and one counters line per group of ranks sharing
//! identical counters. `CountRecord` is the per-call view the aggregation
//! components consume.

use serde::Serialize;

/// One counters line: a set of ranks that all reported the same counters
///
/// `counts` always holds exactly `comm_size` values, one per peer rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankCounters {
    /// Ascending, distinct rank ids sharing this counters vector
    pub ranks: Vec<u32>,

    /// Element counts, indexed by destination (send) or source (recv) rank
    pub counts: Vec<u64>,
}

impl RankCounters {
    /// Number of zero-valued counters in this line
    pub fn zeros(&self) -> usize {
        self.counts.iter().filter(|&&c| c == 0).count()
    }

    /// Number of non-zero counters (the out/in-degree of these ranks)
    pub fn degree(&self) -> usize {
        self.counts.len() - self.zeros()
    }

    /// Sum of all counters on this line
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Render the counters the way the capture layer persists them
    pub fn counters_string(&self) -> String {
        let strings: Vec<String> = self.counts.iter().map(|c| c.to_string()).collect();
        strings.join(" ")
    }
}

/// One parsed block of a counts file (a single communicator configuration)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountsBlock {
    /// Number of ranks participating in the calls this block covers
    pub comm_size: usize,

    /// Element size in bytes; 1 for files predating the header field
    pub datatype_size: u64,

    /// First call index of the block's range
    pub first_call: u32,

    /// Last call index of the block's range (inclusive)
    pub last_call: u32,

    /// True number of profiled calls, including untracked ones
    pub num_calls: usize,

    /// Call indices the capture layer tracked (may be capped)
    pub calls: Vec<u32>,

    /// Counters lines; their rank sets partition `0..comm_size`
    pub entries: Vec<RankCounters>,
}

impl CountsBlock {
    /// Whether this block holds counters for the given call
    pub fn covers_call(&self, call: u32) -> bool {
        if self.calls.contains(&call) {
            return true;
        }
        // Untracked calls beyond the enumeration cap still fall in the range
        self.calls.len() < self.num_calls && self.first_call <= call && call <= self.last_call
    }

    /// Counters line covering the given rank, if any
    pub fn counters_for_rank(&self, rank: u32) -> Option<&RankCounters> {
        self.entries.iter().find(|e| e.ranks.contains(&rank))
    }
}

/// One alltoallv call's captured data, assembled from both contexts
///
/// Immutable once produced by the record stream; the classifier and the
/// statistics aggregator both consume the same records independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRecord {
    /// Index of the call in the application's call sequence
    pub call_index: u32,

    /// Number of ranks participating in the call
    pub comm_size: usize,

    /// Size in bytes of one sent element
    pub send_datatype_size: u64,

    /// Size in bytes of one received element
    pub recv_datatype_size: u64,

    /// Send counters, grouped by ranks with identical vectors
    pub send_counters: Vec<RankCounters>,

    /// Receive counters, grouped by ranks with identical vectors
    pub recv_counters: Vec<RankCounters>,
}
