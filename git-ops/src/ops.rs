//! Mutating and network git operations over the argv runner.
//!
//! Every caller-influenced value is validated before it reaches the argv
//! array; refs use the strict Gerrit change-ref pattern.

use std::path::Path;

use crate::errors::GitResult;
use crate::run::{
    CHECKOUT_TIMEOUT, FETCH_TIMEOUT, GitOutput, PROBE_TIMEOUT, PUSH_TIMEOUT, run_git,
    run_git_checked,
};
use crate::validate::{ensure_branch_name, ensure_change_ref, ensure_remote_name};

/// `git fetch <remote> <ref>`; the ref lands in FETCH_HEAD.
pub async fn fetch_ref(cwd: &Path, remote: &str, git_ref: &str) -> GitResult<()> {
    ensure_remote_name(remote)?;
    ensure_change_ref(git_ref)?;
    run_git_checked(&["fetch", remote, git_ref], cwd, FETCH_TIMEOUT).await?;
    Ok(())
}

/// Switch to an existing local branch.
pub async fn checkout_branch(cwd: &Path, branch: &str) -> GitResult<()> {
    ensure_branch_name(branch)?;
    run_git_checked(&["checkout", branch], cwd, CHECKOUT_TIMEOUT).await?;
    Ok(())
}

/// Detached checkout of the last fetched ref.
pub async fn checkout_fetch_head(cwd: &Path) -> GitResult<()> {
    run_git_checked(&["checkout", "FETCH_HEAD"], cwd, CHECKOUT_TIMEOUT).await?;
    Ok(())
}

/// Create `branch` at FETCH_HEAD and switch to it.
pub async fn create_branch_from_fetch_head(cwd: &Path, branch: &str) -> GitResult<()> {
    ensure_branch_name(branch)?;
    run_git_checked(&["checkout", "-b", branch, "FETCH_HEAD"], cwd, CHECKOUT_TIMEOUT).await?;
    Ok(())
}

/// `git reset --hard FETCH_HEAD`.
pub async fn reset_hard_fetch_head(cwd: &Path) -> GitResult<()> {
    run_git_checked(&["reset", "--hard", "FETCH_HEAD"], cwd, CHECKOUT_TIMEOUT).await?;
    Ok(())
}

/// Point `branch` at `<remote>/<upstream>`.
pub async fn set_upstream(
    cwd: &Path,
    branch: &str,
    remote: &str,
    upstream: &str,
) -> GitResult<()> {
    ensure_branch_name(branch)?;
    ensure_remote_name(remote)?;
    ensure_branch_name(upstream)?;
    let target = format!("{remote}/{upstream}");
    run_git_checked(
        &["branch", &format!("--set-upstream-to={target}"), branch],
        cwd,
        PROBE_TIMEOUT,
    )
    .await?;
    Ok(())
}

/// Does a local branch exist?
pub async fn branch_exists(cwd: &Path, branch: &str) -> GitResult<bool> {
    ensure_branch_name(branch)?;
    let full = format!("refs/heads/{branch}");
    let out = run_git(&["show-ref", "--verify", "--quiet", &full], cwd, PROBE_TIMEOUT).await?;
    Ok(out.success())
}

/// Does `branch` exist on `remote`? One network round-trip.
pub async fn remote_branch_exists(cwd: &Path, remote: &str, branch: &str) -> GitResult<bool> {
    ensure_remote_name(remote)?;
    ensure_branch_name(branch)?;
    let full = format!("refs/heads/{branch}");
    let out = run_git(&["ls-remote", "--heads", remote, &full], cwd, FETCH_TIMEOUT).await?;
    Ok(out.success() && !out.stdout.trim().is_empty())
}

/// Amend HEAD keeping the message unchanged, so installed hooks run.
pub async fn amend_keep_message(cwd: &Path) -> GitResult<()> {
    run_git_checked(&["commit", "--amend", "--no-edit"], cwd, CHECKOUT_TIMEOUT).await?;
    Ok(())
}

/// `git push [--dry-run] <remote> HEAD:<refspec>`.
///
/// The exit status is reported, not enforced: the push pipeline classifies
/// the combined output itself. The refspec is assembled by the caller from
/// pre-validated parts.
pub async fn push(
    cwd: &Path,
    remote: &str,
    refspec: &str,
    dry_run: bool,
) -> GitResult<GitOutput> {
    ensure_remote_name(remote)?;
    let target = format!("HEAD:{refspec}");
    let mut args = vec!["push"];
    if dry_run {
        args.push("--dry-run");
    }
    args.push(remote);
    args.push(&target);
    run_git(&args, cwd, PUSH_TIMEOUT).await
}

/// `git worktree add --detach <path> FETCH_HEAD`.
pub async fn add_worktree_at_fetch_head(cwd: &Path, path: &Path) -> GitResult<()> {
    let p = path.to_string_lossy().into_owned();
    run_git_checked(
        &["worktree", "add", "--detach", p.as_str(), "FETCH_HEAD"],
        cwd,
        CHECKOUT_TIMEOUT,
    )
    .await?;
    Ok(())
}

/// `git worktree remove --force <path>`.
pub async fn remove_worktree(cwd: &Path, path: &Path) -> GitResult<()> {
    let p = path.to_string_lossy().into_owned();
    run_git_checked(
        &["worktree", "remove", "--force", p.as_str()],
        cwd,
        CHECKOUT_TIMEOUT,
    )
    .await?;
    Ok(())
}

/// Paths changed by the commit at `rev` relative to its parent.
pub async fn list_changed_files(cwd: &Path, rev: &str) -> GitResult<Vec<String>> {
    // rev is internal ("HEAD"), never user input.
    let range = format!("{rev}^..{rev}");
    let out = run_git(
        &["diff", "--name-only", "--no-renames", &range],
        cwd,
        PROBE_TIMEOUT,
    )
    .await?;
    if !out.success() {
        // Root commit: diff against the empty tree instead.
        let out = run_git_checked(
            &["show", "--name-only", "--format=", rev],
            cwd,
            PROBE_TIMEOUT,
        )
        .await?;
        return Ok(collect_lines(&out.stdout));
    }
    Ok(collect_lines(&out.stdout))
}

fn collect_lines(s: &str) -> Vec<String> {
    s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
