//! In-process repository reads via libgit2.
//!
//! Reads never spawn a subprocess; mutating and network operations live in
//! [`crate::ops`] and go through the argv runner.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use git2::Repository;

use crate::errors::{Error, GitResult};
use crate::ident_util::host_of_remote_url;

fn open(cwd: &Path) -> GitResult<Repository> {
    Repository::discover(cwd).map_err(|_| Error::NotARepo)
}

/// True when `cwd` is inside a git work tree.
pub fn is_in_repo(cwd: &Path) -> bool {
    Repository::discover(cwd).is_ok()
}

/// Absolute path of the `.git` directory.
pub fn git_dir(cwd: &Path) -> GitResult<PathBuf> {
    let repo = open(cwd)?;
    Ok(repo.path().to_path_buf())
}

/// Full commit message of HEAD.
pub fn head_commit_message(cwd: &Path) -> GitResult<String> {
    let repo = open(cwd)?;
    let head = repo.head()?.peel_to_commit()?;
    Ok(head.message().unwrap_or("").to_string())
}

/// Current branch name, or `None` when HEAD is detached.
pub fn current_branch(cwd: &Path) -> GitResult<Option<String>> {
    let repo = open(cwd)?;
    let head = match repo.head() {
        Ok(h) => h,
        // Unborn branch: treat like detached.
        Err(_) => return Ok(None),
    };
    if !head.is_branch() {
        return Ok(None);
    }
    Ok(head.shorthand().map(str::to_string))
}

/// Upstream of the current branch as `(remote, branch)`, if configured.
pub fn tracking_branch(cwd: &Path) -> GitResult<Option<(String, String)>> {
    let repo = open(cwd)?;
    let Some(local) = current_branch(cwd)? else {
        return Ok(None);
    };
    let branch = repo.find_branch(&local, git2::BranchType::Local)?;
    let upstream = match branch.upstream() {
        Ok(u) => u,
        Err(_) => return Ok(None),
    };
    // Upstream shorthand is "<remote>/<branch>"; the branch part may itself
    // contain slashes.
    let Some(short) = upstream.get().shorthand() else {
        return Ok(None);
    };
    Ok(short
        .split_once('/')
        .map(|(r, b)| (r.to_string(), b.to_string())))
}

/// Configured remotes as name → URL (push URL preferred when set).
pub fn list_remotes(cwd: &Path) -> GitResult<BTreeMap<String, String>> {
    let repo = open(cwd)?;
    let mut out = BTreeMap::new();
    for name in repo.remotes()?.iter().flatten() {
        let remote = repo.find_remote(name)?;
        let url = remote.pushurl().or(remote.url());
        if let Some(url) = url {
            out.insert(name.to_string(), url.to_string());
        }
    }
    Ok(out)
}

/// The remote whose URL points at `host`, comparing hostnames after parsing
/// both URL and scp-like (`git@host:path`) forms.
pub fn find_matching_remote(
    remotes: &BTreeMap<String, String>,
    host: &str,
) -> Option<String> {
    let want = host_of_remote_url(host)?;
    for (name, url) in remotes {
        if host_of_remote_url(url).is_some_and(|h| h.eq_ignore_ascii_case(&want)) {
            return Some(name.clone());
        }
    }
    None
}

/// True when HEAD's message already carries a Change-Id trailer line.
pub fn commit_has_change_id(cwd: &Path) -> GitResult<bool> {
    let message = head_commit_message(cwd)?;
    Ok(message
        .lines()
        .any(|l| l.to_ascii_lowercase().starts_with("change-id: i")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_remote_handles_url_and_scp_forms() {
        let mut remotes = BTreeMap::new();
        remotes.insert(
            "origin".to_string(),
            "https://gerrit.example.com/proj".to_string(),
        );
        remotes.insert(
            "backup".to_string(),
            "git@other.example.com:proj.git".to_string(),
        );

        assert_eq!(
            find_matching_remote(&remotes, "https://gerrit.example.com"),
            Some("origin".to_string())
        );
        assert_eq!(
            find_matching_remote(&remotes, "https://other.example.com"),
            Some("backup".to_string())
        );
        assert_eq!(find_matching_remote(&remotes, "https://elsewhere.io"), None);
    }
}
