//! Pre-spawn input validation.
//!
//! Every string that ends up inside a git invocation goes through one of
//! these gates first. Git is always spawned with an argv array (never a
//! shell), so the gates guard against option injection and malformed refs,
//! not quoting.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::{Error, GitResult};

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_\-./]+$").unwrap();
    static ref CHANGE_REF_RE: Regex = Regex::new(r"^refs/changes/\d{2}/\d+/\d+$").unwrap();
}

/// Truncated, control-character-free echo of a rejected value.
pub fn sanitize_echo(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| if c.is_control() { '?' } else { c })
        .take(64)
        .collect();
    if value.chars().count() > 64 {
        format!("{cleaned}…")
    } else {
        cleaned
    }
}

fn ensure_name(kind: &str, value: &str) -> GitResult<()> {
    if !value.is_empty() && NAME_RE.is_match(value) && !value.starts_with('-') {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{kind} {:?} contains unsupported characters",
            sanitize_echo(value)
        )))
    }
}

/// Branch names: letters, digits, `_-./`; never option-shaped.
pub fn ensure_branch_name(value: &str) -> GitResult<()> {
    ensure_name("branch name", value)
}

/// Remote names share the branch character class.
pub fn ensure_remote_name(value: &str) -> GitResult<()> {
    ensure_name("remote name", value)
}

/// Gerrit change refs are validated against the strict pattern
/// `refs/changes/NN/NNNN/N`.
pub fn ensure_change_ref(value: &str) -> GitResult<()> {
    if CHANGE_REF_RE.is_match(value) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "ref {:?} is not a Gerrit change ref",
            sanitize_echo(value)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        assert!(ensure_branch_name("review/12345").is_ok());
        assert!(ensure_branch_name("feature-x.1_y").is_ok());
        assert!(ensure_remote_name("origin").is_ok());
    }

    #[test]
    fn rejects_option_shaped_and_weird_names() {
        assert!(ensure_branch_name("-b").is_err());
        assert!(ensure_branch_name("").is_err());
        assert!(ensure_branch_name("a b").is_err());
        assert!(ensure_branch_name("x;rm -rf").is_err());
        assert!(ensure_remote_name("ori gin").is_err());
    }

    #[test]
    fn change_ref_pattern_is_strict() {
        assert!(ensure_change_ref("refs/changes/45/12345/3").is_ok());
        assert!(ensure_change_ref("refs/changes/5/12345/3").is_err());
        assert!(ensure_change_ref("refs/heads/main").is_err());
        assert!(ensure_change_ref("refs/changes/45/12345/").is_err());
    }

    #[test]
    fn echo_is_truncated_and_sanitized() {
        let long = "x".repeat(100);
        let echoed = sanitize_echo(&long);
        assert!(echoed.chars().count() <= 65);
        assert!(sanitize_echo("a\x1b[31mb").contains('?'));
    }
}
