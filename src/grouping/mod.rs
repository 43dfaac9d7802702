//! Online grouping of ranks by communication volume.
//!
//! Points arrive one at a time as (rank, scalar) pairs and are bucketed
//! into contiguous value ranges. A point joins the first existing group,
//! in creation order, whose range extended by an allowance contains its
//! value; otherwise it opens a new group. The allowance grows with the
//! group's span (`max(min_gap, max - min)`), so tight clusters stay
//! separate while spread-out clusters keep absorbing nearby values. A
//! point is never re-evaluated after assignment, which makes the result
//! deterministic for a fixed insertion order (and order-sensitive, as in
//! the capture layer's live grouping).

use log::debug;
use serde::Serialize;

/// Tuning of the group-compatibility rule
#[derive(Debug, Clone, Copy)]
pub struct GroupingPolicy {
    /// Smallest distance beyond a group's range that still joins it
    pub min_gap: u64,
}

impl Default for GroupingPolicy {
    fn default() -> Self {
        Self { min_gap: 1 }
    }
}

/// One cluster: inclusive value interval and its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    /// Smallest member value
    pub min: u64,

    /// Largest member value
    pub max: u64,

    /// Member ids, in insertion order
    pub members: Vec<u32>,
}

impl Group {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    fn accepts(&self, value: u64, policy: GroupingPolicy) -> bool {
        let allowance = policy.min_gap.max(self.max - self.min);
        value >= self.min.saturating_sub(allowance) && value <= self.max + allowance
    }
}

/// Two-phase clustering engine: `add` points, then `finalize`
#[derive(Debug, Default)]
pub struct GroupingEngine {
    policy: GroupingPolicy,
    groups: Vec<Group>,
}

impl GroupingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: GroupingPolicy) -> Self {
        Self {
            policy,
            groups: Vec::new(),
        }
    }

    /// Ingest one (id, value) point
    pub fn add(&mut self, id: u32, value: u64) {
        let policy = self.policy;
        match self.groups.iter_mut().find(|g| g.accepts(value, policy)) {
            Some(group) => {
                group.min = group.min.min(value);
                group.max = group.max.max(value);
                group.members.push(id);
                debug!("point ({}, {}) joins group [{}, {}]", id, value, group.min, group.max);
            }
            None => {
                debug!("point ({}, {}) opens a new group", id, value);
                self.groups.push(Group {
                    min: value,
                    max: value,
                    members: vec![id],
                });
            }
        }
    }

    /// Return the groups in creation order and reset the engine
    ///
    /// Every added id appears in exactly one group. A second call without
    /// further `add`s yields an empty list.
    pub fn finalize(&mut self) -> Vec<Group> {
        std::mem::take(&mut self.groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(points: &[u64]) -> Vec<Group> {
        let mut engine = GroupingEngine::new();
        for (id, &value) in points.iter().enumerate() {
            engine.add(id as u32, value);
        }
        engine.finalize()
    }

    #[test]
    fn test_consecutive_values_form_one_group() {
        let groups = run(&[1, 2, 3]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].min, 1);
        assert_eq!(groups[0].max, 3);
        assert_eq!(groups[0].members, vec![0, 1, 2]);
    }

    #[test]
    fn test_nearby_value_joins_via_span_allowance() {
        // [1,3] has span 2, so 5 is still within reach
        let groups = run(&[1, 2, 3, 5]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].max, 5);
        assert_eq!(groups[0].size(), 4);
    }

    #[test]
    fn test_distant_values_split() {
        let groups = run(&[1, 2, 3, 10, 11, 12]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].members, vec![0, 1, 2]);
        assert_eq!(groups[1].min, 10);
        assert_eq!(groups[1].max, 12);
        assert_eq!(groups[1].members, vec![3, 4, 5]);
    }

    #[test]
    fn test_value_below_group_minimum_joins() {
        let groups = run(&[5, 4]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].min, 4);
        assert_eq!(groups[0].max, 5);
    }

    #[test]
    fn test_identical_values_share_a_group() {
        let groups = run(&[7, 7, 7]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].min, 7);
        assert_eq!(groups[0].max, 7);
        assert_eq!(groups[0].size(), 3);
    }

    #[test]
    fn test_finalize_resets_state() {
        let mut engine = GroupingEngine::new();
        engine.add(0, 1);
        engine.add(1, 2);
        assert_eq!(engine.finalize().len(), 1);
        assert!(engine.finalize().is_empty());
    }

    #[test]
    fn test_first_compatible_group_wins() {
        // 0 and 100 open two groups; 2 is only compatible with the first
        let mut engine = GroupingEngine::new();
        engine.add(0, 0);
        engine.add(1, 100);
        engine.add(2, 1);
        let groups = engine.finalize();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].members, vec![0, 2]);
        assert_eq!(groups[1].members, vec![1]);
    }

    #[test]
    fn test_tight_policy_splits_adjacent_values() {
        let mut engine = GroupingEngine::with_policy(GroupingPolicy { min_gap: 0 });
        engine.add(0, 1);
        engine.add(1, 2);
        let groups = engine.finalize();
        assert_eq!(groups.len(), 2);
    }
}
