//! Ephemeral worktree session for the AI review pass.
//!
//! The session is a scoped resource: creating it fetches the patchset ref
//! and materializes a detached worktree at a unique path; dropping it
//! removes the worktree again. Cleanup runs on every exit path, including
//! panics, via `Drop`.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::errors::ReviewResult;

/// Disambiguates worktrees created within the same millisecond.
static SEQ: AtomicU64 = AtomicU64::new(0);

/// A checked-out patchset in a throwaway worktree.
#[derive(Debug)]
pub struct WorktreeSession {
    path: PathBuf,
    repo_root: PathBuf,
    original_cwd: PathBuf,
    change_number: u32,
    removed: bool,
}

impl WorktreeSession {
    /// Fetch `git_ref` from `remote` and materialize it in a new worktree.
    ///
    /// The path embeds pid, a millisecond timestamp and a process-local
    /// sequence number, so concurrent invocations can never collide.
    pub async fn create(
        repo_root: &Path,
        remote: &str,
        git_ref: &str,
        change_number: u32,
    ) -> ReviewResult<Self> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "gerrit-review-{change_number}-{}-{millis}-{seq}",
            std::process::id()
        ));

        git_ops::ops::fetch_ref(repo_root, remote, git_ref).await?;
        git_ops::ops::add_worktree_at_fetch_head(repo_root, &path).await?;
        debug!("worktree: created {}", path.display());

        Ok(Self {
            path,
            repo_root: repo_root.to_path_buf(),
            original_cwd: std::env::current_dir()?,
            change_number,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn change_number(&self) -> u32 {
        self.change_number
    }

    /// Working directory the command started in; the session never changes
    /// the process cwd (tools run with an explicit `current_dir`), so there
    /// is nothing to restore beyond removing the tree.
    pub fn original_cwd(&self) -> &Path {
        &self.original_cwd
    }

    /// Graceful removal; prefer this over relying on `Drop` so errors are
    /// observable.
    pub async fn remove(mut self) -> ReviewResult<()> {
        git_ops::ops::remove_worktree(&self.repo_root, &self.path).await?;
        debug!("worktree: removed {}", self.path.display());
        self.removed = true;
        Ok(())
    }
}

impl Drop for WorktreeSession {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        // Last-resort synchronous cleanup; also runs while unwinding.
        let status = std::process::Command::new("git")
            .args(["worktree", "remove", "--force"])
            .arg(&self.path)
            .current_dir(&self.repo_root)
            .status();
        match status {
            Ok(s) if s.success() => {}
            _ => warn!(
                "worktree: failed to remove {}; remove it manually",
                self.path.display()
            ),
        }
    }
}
