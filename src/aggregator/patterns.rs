//! Call-pattern deduplication and classification.
//!
//! Every call reduces to a pair of degree signatures: how many ranks send
//! to (receive from) how many peers. Calls sharing both signatures are the
//! same pattern; the table keeps one entry per distinct pattern in
//! discovery order, with the member calls and an index of fan-out
//! patterns (one rank talking to disproportionately many peers).

use crate::parser::schema::{CountRecord, RankCounters};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// Degree signature: peers-talked-to -> number of ranks doing so
///
/// Map equality is the pattern-matching rule: both key sets and values
/// must agree, and a key with value 0 is distinct from an absent key.
pub type Signature = BTreeMap<usize, usize>;

/// Derive the degree signature of one context's counters
pub fn degree_signature(entries: &[RankCounters]) -> Signature {
    let mut signature = Signature::new();
    for entry in entries {
        *signature.entry(entry.degree()).or_insert(0) += entry.ranks.len();
    }
    signature
}

/// Whether a send signature describes a fan-out pattern
///
/// A pattern where some ranks send to over 100x more peers than the
/// number of ranks behaving that way.
fn is_fan_out(send: &Signature) -> bool {
    send.iter().any(|(&sent_to, &n)| sent_to > n * 100)
}

/// One distinct call pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallPattern {
    /// Send-side degree signature
    pub send: Signature,

    /// Receive-side degree signature
    pub recv: Signature,

    /// Number of calls exhibiting this pattern
    pub count: usize,

    /// Call indices, in submission order
    pub calls: Vec<u32>,

    /// Set when the send signature is a fan-out
    pub fan_out: bool,
}

/// Discovery-ordered table of distinct call patterns
#[derive(Debug, Default, Clone, Serialize)]
pub struct PatternTable {
    patterns: Vec<CallPattern>,
    /// Indices (into `patterns`) of the fan-out subset, discovery order
    fan_out: Vec<usize>,
}

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one record into the table
    ///
    /// **Public** - main entry point for pattern analysis
    ///
    /// A linear scan in discovery order finds the first pattern whose
    /// signature pair equals the record's; distinct patterns are expected
    /// to be few relative to call volume, so the scan stays cheap.
    pub fn classify(&mut self, record: &CountRecord) {
        let send = degree_signature(&record.send_counters);
        let recv = degree_signature(&record.recv_counters);

        let idx = match self
            .patterns
            .iter()
            .position(|p| p.send == send && p.recv == recv)
        {
            Some(idx) => {
                debug!("call #{} matches pattern {}", record.call_index, idx);
                self.patterns[idx].count += 1;
                self.patterns[idx].calls.push(record.call_index);
                idx
            }
            None => {
                debug!("call #{} starts a new pattern", record.call_index);
                self.patterns.push(CallPattern {
                    send,
                    recv,
                    count: 1,
                    calls: vec![record.call_index],
                    fan_out: false,
                });
                self.patterns.len() - 1
            }
        };

        // Fan-out detection runs on every call, matched or new
        if is_fan_out(&self.patterns[idx].send) {
            self.mark_fan_out(idx);
        }
    }

    fn mark_fan_out(&mut self, idx: usize) {
        self.patterns[idx].fan_out = true;
        if !self.fan_out.contains(&idx) {
            self.fan_out.push(idx);
        }
    }

    /// All patterns in discovery order
    pub fn patterns(&self) -> &[CallPattern] {
        &self.patterns
    }

    /// The fan-out subset, in discovery order
    pub fn fan_out_patterns(&self) -> impl Iterator<Item = &CallPattern> {
        self.fan_out.iter().map(|&idx| &self.patterns[idx])
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Fold another table into this one
    ///
    /// Matching is not a plain union: each incoming pattern goes through
    /// the same signature-equality scan, so tables built from disjoint
    /// call ranges combine exactly as if one table had seen all calls.
    pub fn merge(&mut self, other: PatternTable) {
        for incoming in other.patterns {
            match self
                .patterns
                .iter()
                .position(|p| p.send == incoming.send && p.recv == incoming.recv)
            {
                Some(idx) => {
                    self.patterns[idx].count += incoming.count;
                    self.patterns[idx].calls.extend(incoming.calls);
                }
                None => self.patterns.push(incoming),
            }
        }

        // Signatures determine the flag, so rebuilding the index after the
        // fold preserves discovery order
        self.fan_out = self
            .patterns
            .iter()
            .enumerate()
            .filter(|(_, p)| p.fan_out)
            .map(|(idx, _)| idx)
            .collect();
    }
}
