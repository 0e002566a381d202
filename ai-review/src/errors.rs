//! Error hierarchy for the AI review orchestrator.

use thiserror::Error;

pub type ReviewResult<T> = Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no ai review tool found on PATH (tried: {0})")]
    ToolNotFound(String),

    #[error("ai tool `{tool}` failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    #[error("ai tool produced an empty response")]
    EmptyResponse,

    #[error("ai response is not a JSON array of comments: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Git(#[from] git_ops::Error),

    #[error(transparent)]
    Api(#[from] gerrit_api::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
