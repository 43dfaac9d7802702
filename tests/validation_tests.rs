use alltoallv_profiler::utils::error::ValidationError;
use alltoallv_profiler::validation::{counters_from_file, validate_job, validation_files};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SEND_FILE: &str = "Number of ranks: 2\n\
                         Datatype size: 4\n\
                         Alltoallv calls 0-1\n\
                         Count: 2 calls - 0 1 \n\
                         \n\
                         BEGINNING DATA\n\
                         Rank(s) 0: 3 5 \n\
                         Rank(s) 1: 0 7 \n\
                         END DATA\n";

const RECV_FILE: &str = "Number of ranks: 2\n\
                         Datatype size: 4\n\
                         Alltoallv calls 0-1\n\
                         Count: 2 calls - 0 1 \n\
                         \n\
                         BEGINNING DATA\n\
                         Rank(s) 0-1: 4 4 \n\
                         END DATA\n";

fn write_job_files(dir: &Path) {
    fs::write(dir.join("send-counters.job1.pid42.txt"), SEND_FILE).unwrap();
    fs::write(dir.join("recv-counters.job1.pid42.txt"), RECV_FILE).unwrap();
}

#[test]
fn test_matching_validation_data_passes() {
    let dir = tempdir().unwrap();
    write_job_files(dir.path());
    fs::write(
        dir.path().join("validation_data-pid42-rank1-call0.txt"),
        "0 7 \n4 4 \n",
    )
    .unwrap();
    fs::write(
        dir.path().join("validation_data-pid42-rank0-call1.txt"),
        "3 5\n4 4\n",
    )
    .unwrap();

    let checked = validate_job(dir.path(), 1, 42).unwrap();
    assert_eq!(checked, 2);
}

#[test]
fn test_mismatching_send_counters_fail_with_both_strings() {
    let dir = tempdir().unwrap();
    write_job_files(dir.path());
    fs::write(
        dir.path().join("validation_data-pid42-rank1-call0.txt"),
        "0 8\n4 4\n",
    )
    .unwrap();

    match validate_job(dir.path(), 1, 42) {
        Err(ValidationError::SendMismatch {
            file,
            expected,
            actual,
        }) => {
            assert_eq!(file, "validation_data-pid42-rank1-call0.txt");
            assert_eq!(expected, "0 8");
            assert_eq!(actual, "0 7");
        }
        other => panic!("expected a send mismatch, got {:?}", other),
    }
}

#[test]
fn test_files_from_other_pids_are_ignored() {
    let dir = tempdir().unwrap();
    write_job_files(dir.path());
    fs::write(
        dir.path().join("validation_data-pid43-rank0-call0.txt"),
        "9 9\n9 9\n",
    )
    .unwrap();

    assert!(validation_files(dir.path(), 42).unwrap().is_empty());
    assert_eq!(validate_job(dir.path(), 1, 42).unwrap(), 0);
}

#[test]
fn test_validation_file_needs_exactly_two_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("validation_data-pid42-rank0-call0.txt");

    fs::write(&path, "1 2 3\n").unwrap();
    assert!(matches!(
        counters_from_file(&path),
        Err(ValidationError::BadContents { .. })
    ));

    fs::write(&path, "1 2\n3 4\n5 6\n").unwrap();
    assert!(matches!(
        counters_from_file(&path),
        Err(ValidationError::BadContents { .. })
    ));

    fs::write(&path, "1 2 \n\n3 4\n\n").unwrap();
    let (send, recv) = counters_from_file(&path).unwrap();
    assert_eq!(send, "1 2");
    assert_eq!(recv, "3 4");
}
