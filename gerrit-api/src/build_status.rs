//! CI build-state interpretation over a change's message stream.
//!
//! The state is a pure function of the messages:
//! - no "Build Started" anywhere → `Pending`
//! - latest "Build Started" without a later matching Verified vote → `Running`
//! - first Verified+1 / Verified-1 dated after the latest "Build Started"
//!   (revision numbers must agree when both messages carry one) decides
//!   `Success` / `Failure`
//!
//! Dates are ISO-8601 as emitted by Gerrit; lexicographic comparison equals
//! chronological comparison, so no parsing is needed.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::types::MessageInfo;

lazy_static! {
    static ref BUILD_STARTED_RE: Regex = Regex::new(r"(?i)build\s+started").unwrap();
    static ref VERIFIED_PLUS_RE: Regex = Regex::new(r"Verified\s*\+\s*1").unwrap();
    static ref VERIFIED_MINUS_RE: Regex = Regex::new(r"Verified\s*-\s*1").unwrap();
}

/// Observed CI state for a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Pending,
    Running,
    Success,
    Failure,
    NotFound,
}

impl BuildState {
    /// Terminal states end the watch loop.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BuildState::Success | BuildState::Failure | BuildState::NotFound
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildState::Pending => "pending",
            BuildState::Running => "running",
            BuildState::Success => "success",
            BuildState::Failure => "failure",
            BuildState::NotFound => "not_found",
        }
    }
}

impl std::fmt::Display for BuildState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpret a message stream into a build state.
pub fn interpret(messages: &[MessageInfo]) -> BuildState {
    if messages.is_empty() {
        return BuildState::Pending;
    }

    // Latest Build-Started wins; earlier builds are superseded.
    let last_started = messages
        .iter()
        .filter(|m| BUILD_STARTED_RE.is_match(&m.message))
        .max_by(|a, b| a.date.cmp(&b.date));
    let Some(started) = last_started else {
        return BuildState::Pending;
    };

    for m in messages {
        if m.date <= started.date {
            continue;
        }
        // Revision equality is required only when both sides report one;
        // either side missing falls through to date ordering alone.
        if let (Some(sr), Some(mr)) = (started.revision_number, m.revision_number) {
            if sr != mr {
                continue;
            }
        }
        if VERIFIED_PLUS_RE.is_match(&m.message) {
            return BuildState::Success;
        }
        if VERIFIED_MINUS_RE.is_match(&m.message) {
            return BuildState::Failure;
        }
    }

    BuildState::Running
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(date: &str, text: &str, rev: Option<u32>) -> MessageInfo {
        MessageInfo {
            id: date.to_string(),
            message: text.to_string(),
            date: date.to_string(),
            author: None,
            revision_number: rev,
            tag: None,
        }
    }

    #[test]
    fn empty_stream_is_pending() {
        assert_eq!(interpret(&[]), BuildState::Pending);
    }

    #[test]
    fn no_build_started_is_pending() {
        let m = [msg("2026-01-01 10:00:00", "Uploaded patch set 1.", Some(1))];
        assert_eq!(interpret(&m), BuildState::Pending);
    }

    #[test]
    fn build_started_without_vote_is_running() {
        let m = [
            msg("2026-01-01 10:00:00", "Uploaded patch set 1.", Some(1)),
            msg("2026-01-01 10:01:00", "Build Started https://ci/1", Some(1)),
        ];
        assert_eq!(interpret(&m), BuildState::Running);
    }

    #[test]
    fn verified_plus_one_is_success() {
        let m = [
            msg("2026-01-01 10:01:00", "Build Started https://ci/1", Some(1)),
            msg("2026-01-01 10:09:00", "Patch Set 1: Verified+1", Some(1)),
        ];
        assert_eq!(interpret(&m), BuildState::Success);
    }

    #[test]
    fn verified_minus_one_is_failure() {
        let m = [
            msg("2026-01-01 10:01:00", "build started", Some(1)),
            msg("2026-01-01 10:09:00", "Patch Set 1: Verified -1\n\nBuild failed", Some(1)),
        ];
        assert_eq!(interpret(&m), BuildState::Failure);
    }

    #[test]
    fn vote_for_older_revision_is_ignored() {
        let m = [
            msg("2026-01-01 10:01:00", "Build Started", Some(2)),
            msg("2026-01-01 10:09:00", "Patch Set 1: Verified+1", Some(1)),
        ];
        assert_eq!(interpret(&m), BuildState::Running);
    }

    #[test]
    fn missing_revision_on_either_side_falls_through() {
        let m = [
            msg("2026-01-01 10:01:00", "Build Started", None),
            msg("2026-01-01 10:09:00", "Patch Set 1: Verified+1", Some(1)),
        ];
        assert_eq!(interpret(&m), BuildState::Success);
    }

    #[test]
    fn new_build_supersedes_old_vote() {
        // A second Build-Started after a vote puts the change back to running.
        let m = [
            msg("2026-01-01 10:01:00", "Build Started", Some(1)),
            msg("2026-01-01 10:09:00", "Verified+1", Some(1)),
            msg("2026-01-01 11:00:00", "Build Started", Some(2)),
        ];
        assert_eq!(interpret(&m), BuildState::Running);
    }

    #[test]
    fn vote_before_build_start_does_not_count() {
        let m = [
            msg("2026-01-01 09:00:00", "Verified+1", Some(1)),
            msg("2026-01-01 10:01:00", "Build Started", Some(1)),
        ];
        assert_eq!(interpret(&m), BuildState::Running);
    }

    #[test]
    fn first_vote_after_start_wins() {
        let m = [
            msg("2026-01-01 10:01:00", "Build Started", Some(1)),
            msg("2026-01-01 10:05:00", "Verified -1", Some(1)),
            msg("2026-01-01 10:09:00", "Verified +1", Some(1)),
        ];
        assert_eq!(interpret(&m), BuildState::Failure);
    }

    #[test]
    fn terminal_is_monotonic_under_unrelated_extension() {
        let base = vec![
            msg("2026-01-01 10:01:00", "Build Started", Some(1)),
            msg("2026-01-01 10:09:00", "Verified+1", Some(1)),
        ];
        assert_eq!(interpret(&base), BuildState::Success);
        let mut extended = base.clone();
        extended.push(msg("2026-01-01 10:30:00", "Just a comment.", Some(1)));
        assert_eq!(interpret(&extended), BuildState::Success);
    }
}
