//! Error hierarchy for local VCS operations.

use thiserror::Error;

pub type GitResult<T> = Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not inside a git repository")]
    NotARepo,

    /// A spawned git command exited non-zero. The underlying tool's own
    /// stderr is preserved verbatim, never rewritten.
    #[error("git {command} failed: {stderr}")]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("git {command} timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    /// Pre-spawn validation rejected a value that would have been
    /// interpolated into a git invocation. The echoed value is sanitized.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Git2(#[from] git2::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
