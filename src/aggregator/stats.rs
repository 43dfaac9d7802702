//! Statistics accumulation over count records.
//!
//! The aggregator folds every record into a `CountStats` bundle:
//! message-size tallies against a configurable threshold, and histograms
//! for datatype sizes, communicator sizes, per-call counter extremes and
//! sparsity. Histograms are `BTreeMap`s so reporting enumerates them in
//! ascending key order no matter the insertion order. Snapshots from
//! disjoint call ranges merge by pointwise sum.

use crate::parser::schema::{CountRecord, CountsBlock, RankCounters};
use crate::utils::config::DEFAULT_MSG_SIZE_THRESHOLD;
use crate::utils::error::ReadError;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Histogram: observed value -> number of calls (or ranks) exhibiting it
pub type Histogram = BTreeMap<u64, u64>;

/// Read-only statistics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountStats {
    /// Number of records accumulated
    pub num_calls: u64,

    /// Send messages below the size threshold
    pub num_send_small_msgs: u64,

    /// Send messages at or above the size threshold
    pub num_send_large_msgs: u64,

    /// Send messages below the threshold but not empty
    pub num_send_small_not_zero_msgs: u64,

    /// Communicator size -> number of calls
    pub comm_sizes: Histogram,

    /// Send datatype size -> number of calls
    pub datatypes_send: Histogram,

    /// Recv datatype size -> number of calls
    pub datatypes_recv: Histogram,

    /// Zero-valued send counters per call -> number of calls
    pub call_send_sparsity: Histogram,

    /// Zero-valued recv counters per call -> number of calls
    pub call_recv_sparsity: Histogram,

    /// Per-call send counter minimum -> number of calls
    pub send_mins: Histogram,

    /// Per-call recv counter minimum -> number of calls
    pub recv_mins: Histogram,

    /// Per-call send counter maximum -> number of calls
    pub send_maxs: Histogram,

    /// Per-call recv counter maximum -> number of calls
    pub recv_maxs: Histogram,

    /// Per-call send minimum excluding zeros (0 when all zero)
    pub send_not_zero_mins: Histogram,

    /// Per-call recv minimum excluding zeros (0 when all zero)
    pub recv_not_zero_mins: Histogram,
}

impl CountStats {
    /// Total send messages classified against the threshold
    pub fn total_send_msgs(&self) -> u64 {
        self.num_send_small_msgs + self.num_send_large_msgs
    }

    /// Pointwise sum with another snapshot
    ///
    /// Associative and commutative, so partial runs over disjoint call
    /// ranges can be combined in any order.
    pub fn merge(&mut self, other: &CountStats) {
        self.num_calls += other.num_calls;
        self.num_send_small_msgs += other.num_send_small_msgs;
        self.num_send_large_msgs += other.num_send_large_msgs;
        self.num_send_small_not_zero_msgs += other.num_send_small_not_zero_msgs;

        merge_histogram(&mut self.comm_sizes, &other.comm_sizes);
        merge_histogram(&mut self.datatypes_send, &other.datatypes_send);
        merge_histogram(&mut self.datatypes_recv, &other.datatypes_recv);
        merge_histogram(&mut self.call_send_sparsity, &other.call_send_sparsity);
        merge_histogram(&mut self.call_recv_sparsity, &other.call_recv_sparsity);
        merge_histogram(&mut self.send_mins, &other.send_mins);
        merge_histogram(&mut self.recv_mins, &other.recv_mins);
        merge_histogram(&mut self.send_maxs, &other.send_maxs);
        merge_histogram(&mut self.recv_maxs, &other.recv_maxs);
        merge_histogram(&mut self.send_not_zero_mins, &other.send_not_zero_mins);
        merge_histogram(&mut self.recv_not_zero_mins, &other.recv_not_zero_mins);
    }
}

fn merge_histogram(into: &mut Histogram, from: &Histogram) {
    for (&key, &value) in from {
        *into.entry(key).or_insert(0) += value;
    }
}

fn bump(histogram: &mut Histogram, key: u64) {
    *histogram.entry(key).or_insert(0) += 1;
}

/// Extremes and sparsity of one context's counters
struct CounterScan {
    min: u64,
    max: u64,
    not_zero_min: u64,
    zeros: u64,
}

fn scan_counters(entries: &[RankCounters]) -> CounterScan {
    let mut min: Option<u64> = None;
    let mut max: Option<u64> = None;
    let mut not_zero_min: Option<u64> = None;
    let mut zeros: u64 = 0;

    for entry in entries {
        let weight = entry.ranks.len() as u64;
        zeros += entry.zeros() as u64 * weight;
        for &count in &entry.counts {
            min = Some(min.map_or(count, |m| m.min(count)));
            max = Some(max.map_or(count, |m| m.max(count)));
            if count != 0 {
                not_zero_min = Some(not_zero_min.map_or(count, |m| m.min(count)));
            }
        }
    }

    CounterScan {
        min: min.unwrap_or(0),
        max: max.unwrap_or(0),
        not_zero_min: not_zero_min.unwrap_or(0),
        zeros,
    }
}

/// Accumulator folding count records into a `CountStats` snapshot
pub struct StatsAggregator {
    size_threshold: u64,
    stats: CountStats,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_MSG_SIZE_THRESHOLD)
    }
}

impl StatsAggregator {
    /// Create an aggregator classifying messages against `size_threshold` bytes
    pub fn new(size_threshold: u64) -> Self {
        Self {
            size_threshold,
            stats: CountStats::default(),
        }
    }

    /// Fold one record into the running statistics
    ///
    /// Never fails on records produced by the parser: every field used
    /// here was validated at parse time.
    pub fn accumulate(&mut self, record: &CountRecord) {
        let stats = &mut self.stats;
        stats.num_calls += 1;

        bump(&mut stats.comm_sizes, record.comm_size as u64);
        bump(&mut stats.datatypes_send, record.send_datatype_size);
        bump(&mut stats.datatypes_recv, record.recv_datatype_size);

        // Message-size classification runs on the send side only, once per
        // rank covered by each counters line
        for entry in &record.send_counters {
            let weight = entry.ranks.len() as u64;
            for &count in &entry.counts {
                let bytes = count * record.send_datatype_size;
                if bytes < self.size_threshold {
                    stats.num_send_small_msgs += weight;
                    if count != 0 {
                        stats.num_send_small_not_zero_msgs += weight;
                    }
                } else {
                    stats.num_send_large_msgs += weight;
                }
            }
        }

        let send = scan_counters(&record.send_counters);
        bump(&mut stats.send_mins, send.min);
        bump(&mut stats.send_maxs, send.max);
        bump(&mut stats.send_not_zero_mins, send.not_zero_min);
        bump(&mut stats.call_send_sparsity, send.zeros);

        let recv = scan_counters(&record.recv_counters);
        bump(&mut stats.recv_mins, recv.min);
        bump(&mut stats.recv_maxs, recv.max);
        bump(&mut stats.recv_not_zero_mins, recv.not_zero_min);
        bump(&mut stats.call_recv_sparsity, recv.zeros);

        debug!(
            "accumulated call #{} (comm size {})",
            record.call_index, record.comm_size
        );
    }

    /// Threshold the aggregator classifies against
    pub fn size_threshold(&self) -> u64 {
        self.size_threshold
    }

    /// Borrow the running snapshot
    pub fn stats(&self) -> &CountStats {
        &self.stats
    }

    /// Consume the aggregator, yielding the final snapshot
    pub fn into_stats(self) -> CountStats {
        self.stats
    }
}

/// One message-size bin: `min <= bytes < max`, the last bin unbounded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bin {
    pub min: u64,
    /// Exclusive upper bound; `None` means no maximum
    pub max: Option<u64>,
    /// Weighted number of messages falling in the bin
    pub size: u64,
}

impl Bin {
    fn holds(&self, value: u64) -> bool {
        match self.max {
            Some(max) => self.min <= value && value < max,
            None => value >= self.min,
        }
    }
}

/// Build empty bins from ascending byte thresholds
///
/// `[t1, t2]` yields `[0,t1) [t1,t2) [t2,∞)`; no thresholds yield a
/// single unbounded bin.
pub fn create_bins(thresholds: &[u64]) -> Vec<Bin> {
    let mut bins = Vec::with_capacity(thresholds.len() + 1);
    let mut start = 0;
    for &threshold in thresholds {
        bins.push(Bin {
            min: start,
            max: Some(threshold),
            size: 0,
        });
        start = threshold;
    }
    bins.push(Bin {
        min: start,
        max: None,
        size: 0,
    });
    bins
}

/// Count one block's weighted counter values into the bins
///
/// Every counter value weighs `num_calls * |rank set|` messages of
/// `count * datatype_size` bytes.
pub fn bin_block(bins: &mut [Bin], block: &CountsBlock) {
    for entry in &block.entries {
        let weight = block.num_calls as u64 * entry.ranks.len() as u64;
        for &count in &entry.counts {
            let bytes = count * block.datatype_size;
            if let Some(bin) = bins.iter_mut().find(|b| b.holds(bytes)) {
                bin.size += weight;
            }
        }
    }
}

/// Bin all counter values of a counts file by message size
pub fn bins_from_file(path: &Path, thresholds: &[u64]) -> Result<Vec<Bin>, ReadError> {
    use crate::parser::counts::CountsReader;

    debug!("binning values from {}", path.display());
    let mut bins = create_bins(thresholds);
    let mut reader = CountsReader::open(path)?;
    while let Some(block) = reader.next_block()? {
        bin_block(&mut bins, &block);
    }
    Ok(bins)
}
