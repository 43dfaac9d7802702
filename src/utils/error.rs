//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while encoding or decoding compressed rank lists
#[derive(Error, Debug)]
pub enum NotationError {
    #[error("invalid token '{0}': expected an integer or 'a-b' range")]
    InvalidToken(String),

    #[error("reversed range '{0}-{1}': start must not exceed end")]
    ReversedRange(u32, u32),

    #[error("ids must be strictly ascending: {0} follows {1}")]
    NotAscending(u32, u32),
}

/// Errors that can occur while reading counts or timings files
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: malformed header: {reason}")]
    MalformedHeader { path: String, reason: String },

    #[error("{path}: block for calls {first}-{last}: {reason}")]
    MalformedBlock {
        path: String,
        first: u32,
        last: u32,
        reason: String,
    },

    #[error("{path}: block for calls {first}-{last} ended before END DATA")]
    Truncated { path: String, first: u32, last: u32 },

    #[error("send file {send} and recv file {recv} disagree: {reason}")]
    ContextMismatch {
        send: String,
        recv: String,
        reason: String,
    },
}

/// Errors that can occur during point lookups in counts files
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("no block covers call {0}")]
    CallNotFound(u32),

    #[error("no counters for rank {rank} in the block covering call {call}")]
    RankNotFound { rank: u32, call: u32 },

    #[error("no counts files for job {job_id} under {dir}")]
    CountsFilesNotFound { job_id: u32, dir: String },

    #[error(transparent)]
    Read(#[from] ReadError),
}

/// Errors that can occur while checking captured validation data
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{file}: send counters do not match: expected '{expected}' but got '{actual}'")]
    SendMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("{file}: recv counters do not match: expected '{expected}' but got '{actual}'")]
    RecvMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("{0}: validation file name has the wrong format")]
    BadFilename(String),

    #[error("{file}: expected exactly two counter lines")]
    BadContents { file: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Errors that can occur while writing report files
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("invalid output path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Notation(#[from] NotationError),
}
