//! Top-level command error: every failure reaching the command boundary is
//! one of these, lowered to the format-appropriate envelope in `main`.

use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Bad options or inputs caught before any network/VCS action.
    #[error("{0}")]
    Validation(String),

    #[error(
        "no change identifier found: pass a change number, Change-Id or URL, \
         or run from a commit carrying a Change-Id footer"
    )]
    NoChangeId,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] gerrit_api::Error),

    #[error(transparent)]
    Git(#[from] git_ops::Error),

    #[error(transparent)]
    Review(#[from] ai_review::errors::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this failure. Build-status owns its special
    /// codes (2 timeout, 3 unexpected) and returns them as success values,
    /// so everything surfacing here is a plain failure.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
