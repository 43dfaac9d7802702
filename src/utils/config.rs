//! Configuration and constants shared across the pipeline.

/// Default threshold (bytes) separating small messages from large ones
pub const DEFAULT_MSG_SIZE_THRESHOLD: u64 = 200;

/// Maximum number of call indices the capture layer enumerates per block.
/// Beyond this cap the header carries a "... (N more call(s) was/were
/// profiled but not tracked)" suffix instead of the full list.
pub const MAX_TRACKED_CALLS: usize = 256;

/// Prefix used for generated per-rank profile summary files
pub const PROFILE_SUMMARY_FILE_PREFIX: &str = "profile_alltoallv_rank";

/// Prefix of validation data files written by the capture layer
pub const VALIDATION_DATA_PREFIX: &str = "validation_data-";

// Markers of the counts-file data section
pub const DATA_SECTION_START: &str = "BEGINNING DATA";
pub const DATA_SECTION_END: &str = "END DATA";

/// Name prefix of the send-context counts file for a job.
/// The capture layer appends its pid: `send-counters.job<job>.pid<pid>.txt`.
pub fn send_counts_file_prefix(job_id: u32) -> String {
    format!("send-counters.job{}.", job_id)
}

/// Name prefix of the receive-context counts file for a job
pub fn recv_counts_file_prefix(job_id: u32) -> String {
    format!("recv-counters.job{}.", job_id)
}

/// Path of the per-rank statistics report for a job
pub fn stats_file_name(job_id: u32, rank: u32) -> String {
    format!("{}{}.job{}.md", PROFILE_SUMMARY_FILE_PREFIX, rank, job_id)
}

/// Path of the patterns report for a job
pub fn patterns_file_name(job_id: u32, rank: u32) -> String {
    format!("patterns-rank{}.job{}.md", rank, job_id)
}

/// Path of the fan-out patterns summary for a job
pub fn patterns_summary_file_name(job_id: u32, rank: u32) -> String {
    format!("patterns-summary-rank{}.job{}.md", rank, job_id)
}
