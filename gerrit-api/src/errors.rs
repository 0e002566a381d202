//! Crate-wide error hierarchy for the Gerrit REST adapter.
//!
//! Goals:
//! - Single root `Error` for all public functions.
//! - Status-aware mapping: every non-2xx keeps its HTTP status so commands
//!   can apply their own 404 policy; only the auth probe maps 401/403 to
//!   `Auth`.
//! - No dynamic dispatch, ergonomic `?` via `From` impls.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type ApiResult<T> = Result<T, Error>;

/// Root error type for the gerrit-api crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-2xx HTTP response. Status preserved for command-specific policy.
    #[error("gerrit returned {status} for {endpoint}: {message}")]
    Api {
        status: u16,
        endpoint: String,
        message: String,
    },

    /// Network/transport failure without a status (DNS/connect/reset/timeout).
    #[error("network error: {0}")]
    Network(String),

    /// Credentials rejected on the auth probe (401/403).
    #[error("authentication failed; run `gerrit setup` to refresh host, username and HTTP password")]
    Auth,

    /// Response body did not match the expected schema for an endpoint.
    #[error("unexpected response from {endpoint}: {detail}")]
    Parse { endpoint: String, detail: String },

    /// Input validation failure before any network call.
    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// HTTP status of an `Api` error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the primary resource was missing (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub(crate) fn parse(endpoint: &str, detail: impl std::fmt::Display) -> Self {
        Error::Parse {
            endpoint: endpoint.to_string(),
            detail: detail.to_string(),
        }
    }

    pub(crate) fn api(status: u16, endpoint: &str, body: &str) -> Self {
        Error::Api {
            status,
            endpoint: endpoint.to_string(),
            message: truncate_body(body),
        }
    }
}

/// Server error bodies can be large HTML pages; keep the first line, capped.
fn truncate_body(body: &str) -> String {
    let line = body.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let line = line.trim();
    if line.chars().count() > 200 {
        let mut s: String = line.chars().take(200).collect();
        s.push('…');
        s
    } else {
        line.to_string()
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Error::Network("request timed out".to_string());
        }
        // Status errors are produced manually in the client so the body is
        // preserved; anything surfacing here is transport-level.
        Error::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_status() {
        let e = Error::api(404, "/changes/42", "Not found: 42");
        assert_eq!(e.status(), Some(404));
        assert!(e.is_not_found());
    }

    #[test]
    fn body_truncation_keeps_first_line() {
        let e = Error::api(500, "/changes/", "boom\nsecond line");
        match e {
            Error::Api { message, .. } => assert_eq!(message, "boom"),
            _ => unreachable!(),
        }
    }
}
