//! Change resolution: whatever the user typed (or didn't) → a canonical
//! change identifier.
//!
//! Order: review URL → plain classification (number / Change-Id) → the
//! Change-Id footer of HEAD when inside a repository. Deterministic and
//! side-effect-free apart from that single VCS read.

use std::path::Path;

use gerrit_api::ident::{
    ChangeRef, change_id_from_commit_message, classify, parse_review_url,
};

use crate::error::{CliError, CliResult};

/// A resolved change: REST identifier plus what we learned on the way.
#[derive(Debug, Clone)]
pub struct ResolvedChange {
    /// Identifier usable in REST paths (change number rendered as digits,
    /// or a full Change-Id).
    pub id: String,
    /// Present when the input carried a number (directly or via URL).
    pub number: Option<u32>,
    /// Patchset from a URL or `NNN/M` shorthand, when given.
    pub patchset: Option<u32>,
}

/// Resolve an optional raw argument against the working tree at `cwd`.
pub fn resolve(raw: Option<&str>, cwd: &Path) -> CliResult<ResolvedChange> {
    if let Some(input) = raw {
        if let Some(url) = parse_review_url(input) {
            return Ok(ResolvedChange {
                id: url.number.to_string(),
                number: Some(url.number),
                patchset: url.patchset,
            });
        }
        return match classify(input) {
            ChangeRef::Number(n) => Ok(ResolvedChange {
                id: n.to_string(),
                number: Some(n),
                patchset: None,
            }),
            ChangeRef::ChangeId(id) => Ok(ResolvedChange {
                id,
                number: None,
                patchset: None,
            }),
            ChangeRef::Invalid => Err(CliError::Validation(format!(
                "`{}` is not a change number, Change-Id or review URL",
                input.trim()
            ))),
        };
    }

    if git_ops::repo::is_in_repo(cwd) {
        let message = git_ops::repo::head_commit_message(cwd)?;
        if let Some(id) = change_id_from_commit_message(&message) {
            return Ok(ResolvedChange {
                id,
                number: None,
                patchset: None,
            });
        }
    }
    Err(CliError::NoChangeId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn nowhere() -> PathBuf {
        // A location that is certainly not a git repository.
        PathBuf::from("/")
    }

    #[test]
    fn resolves_url_with_patchset() {
        let r = resolve(Some("https://g.example/c/proj/+/12345/3"), &nowhere()).unwrap();
        assert_eq!(r.id, "12345");
        assert_eq!(r.patchset, Some(3));
    }

    #[test]
    fn resolves_number_and_change_id() {
        let r = resolve(Some("42"), &nowhere()).unwrap();
        assert_eq!(r.id, "42");
        assert_eq!(r.number, Some(42));

        let cid = "Ideadbeefdeadbeefdeadbeefdeadbeefdeadbeef";
        let r = resolve(Some(cid), &nowhere()).unwrap();
        assert_eq!(r.id, cid);
        assert_eq!(r.number, None);
    }

    #[test]
    fn rejects_garbage_input() {
        assert!(matches!(
            resolve(Some("no-such-thing"), &nowhere()),
            Err(CliError::Validation(_))
        ));
    }

    #[test]
    fn no_input_outside_repo_is_no_change_id() {
        assert!(matches!(
            resolve(None, &nowhere()),
            Err(CliError::NoChangeId)
        ));
    }
}
