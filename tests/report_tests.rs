use alltoallv_profiler::commands::{execute_analyze, AnalyzeArgs};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SEND_FILE: &str = "# Raw counters\n\n\
                         Number of ranks: 4\n\
                         Datatype size: 8\n\
                         Alltoallv calls 0-3\n\
                         Count: 4 calls - 0 1 2 3 \n\
                         \n\
                         BEGINNING DATA\n\
                         Rank(s) 0-2: 10 30 0 1 \n\
                         Rank(s) 3: 0 0 0 50 \n\
                         END DATA\n";

const RECV_FILE: &str = "# Raw counters\n\n\
                         Number of ranks: 4\n\
                         Datatype size: 8\n\
                         Alltoallv calls 0-3\n\
                         Count: 4 calls - 0 1 2 3 \n\
                         \n\
                         BEGINNING DATA\n\
                         Rank(s) 0-3: 5 5 5 5 \n\
                         END DATA\n";

fn analyze_args(dir: &Path, json: bool) -> AnalyzeArgs {
    AnalyzeArgs {
        send_counts: dir.join("send-counters.job3.pid7.txt"),
        recv_counts: dir.join("recv-counters.job3.pid7.txt"),
        output_dir: dir.join("reports"),
        job_id: 3,
        rank: 0,
        size_threshold: 200,
        bins: vec![200, 1024],
        json: json.then(|| dir.join("reports/snapshot.json")),
    }
}

fn write_inputs(dir: &Path) {
    fs::write(dir.join("send-counters.job3.pid7.txt"), SEND_FILE).unwrap();
    fs::write(dir.join("recv-counters.job3.pid7.txt"), RECV_FILE).unwrap();
}

#[test]
fn test_analyze_writes_all_reports() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path());

    execute_analyze(analyze_args(dir.path(), false)).unwrap();

    let reports = dir.path().join("reports");
    let stats = fs::read_to_string(reports.join("profile_alltoallv_rank0.job3.md")).unwrap();
    let patterns = fs::read_to_string(reports.join("patterns-rank0.job3.md")).unwrap();
    let summary = fs::read_to_string(reports.join("patterns-summary-rank0.job3.md")).unwrap();

    assert!(stats.contains("Total number of alltoallv calls: 4"));
    assert!(stats.contains("4/4 calls use a datatype of size 8 while sending data"));
    assert!(stats.contains("4/4 calls use a communicator size of 4"));
    assert!(stats.contains("# Message size distribution"));
    assert!(stats.contains("# Grouping based on the total amount per ranks"));

    // All four calls share one signature
    assert!(patterns.contains("## Pattern #0 (4 alltoallv calls)"));
    assert!(patterns.contains("Alltoallv calls: 0-3"));

    // No fan-out at this communicator size
    assert!(summary.contains("# Patterns summary"));
    assert!(!summary.contains("## Pattern"));
}

#[test]
fn test_analyze_reports_are_deterministic() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path());

    execute_analyze(analyze_args(dir.path(), false)).unwrap();
    let first =
        fs::read_to_string(dir.path().join("reports/profile_alltoallv_rank0.job3.md")).unwrap();

    execute_analyze(analyze_args(dir.path(), false)).unwrap();
    let second =
        fs::read_to_string(dir.path().join("reports/profile_alltoallv_rank0.job3.md")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_analyze_json_snapshot() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path());

    execute_analyze(analyze_args(dir.path(), true)).unwrap();

    let text = fs::read_to_string(dir.path().join("reports/snapshot.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["job_id"], 3);
    assert_eq!(value["stats"]["num_calls"], 4);
    assert_eq!(value["patterns"].as_array().unwrap().len(), 1);
    assert_eq!(value["patterns"][0]["count"], 4);
    // Ranks 0-2 send 41 elements * 8 bytes, rank 3 sends 50 * 8
    let groups = value["volume_groups"].as_array().unwrap();
    assert!(!groups.is_empty());
}

#[test]
fn test_analyze_fails_on_truncated_input() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path());
    // Cut the send file short
    fs::write(
        dir.path().join("send-counters.job3.pid7.txt"),
        SEND_FILE.replace("END DATA\n", ""),
    )
    .unwrap();

    assert!(execute_analyze(analyze_args(dir.path(), false)).is_err());
}
