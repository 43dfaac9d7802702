use alltoallv_profiler::grouping::{Group, GroupingEngine};

fn run(points: &[u64]) -> Vec<Group> {
    let mut engine = GroupingEngine::new();
    for (id, &value) in points.iter().enumerate() {
        engine.add(id as u32, value);
    }
    engine.finalize()
}

#[test]
fn test_single_contiguous_group() {
    let groups = run(&[1, 2, 3]);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].min, 1);
    assert_eq!(groups[0].max, 3);
    assert_eq!(groups[0].size(), 3);
}

#[test]
fn test_finalize_resets_the_engine() {
    let mut engine = GroupingEngine::new();
    engine.add(0, 1);
    engine.add(1, 2);
    engine.add(2, 3);
    assert_eq!(engine.finalize().len(), 1);
    assert!(engine.finalize().is_empty());
}

#[test]
fn test_gap_within_span_allowance_absorbed() {
    let groups = run(&[1, 2, 3, 5]);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].members, vec![0, 1, 2, 3]);
}

#[test]
fn test_far_cluster_opens_second_group() {
    let groups = run(&[1, 2, 3, 10, 11, 12]);
    assert_eq!(groups.len(), 2);
    assert_eq!((groups[0].min, groups[0].max), (1, 3));
    assert_eq!((groups[1].min, groups[1].max), (10, 12));
}

#[test]
fn test_result_depends_on_insertion_order() {
    // Fed in this order, 5 bridges 1..3 and 10; reversed it cannot
    let bridged = run(&[1, 2, 3, 5, 8, 10]);
    let split = run(&[10, 1, 2, 3]);
    assert_eq!(bridged.len(), 1);
    assert_eq!(split.len(), 2);
}

#[test]
fn test_groups_cover_every_point_exactly_once() {
    let points = [4u64, 90, 6, 5, 100, 2, 95];
    let groups = run(&points);
    let mut seen: Vec<u32> = groups.iter().flat_map(|g| g.members.clone()).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..points.len() as u32).collect::<Vec<_>>());
}
