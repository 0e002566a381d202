//! Subprocess git runner: argv arrays, captured output, explicit timeouts.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::errors::{Error, GitResult};

/// Network fetches can be slow on big repos.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(60);
/// Push shares the fetch budget.
pub const PUSH_TIMEOUT: Duration = Duration::from_secs(60);
/// Checkout/reset touch the working tree.
pub const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);
/// Local probes (show-ref, diff --name-only, worktree bookkeeping).
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Captured result of a finished git invocation.
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// stdout and stderr concatenated, for substring classification.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Run `git <args>` with a timeout; the exit status is reported, not
/// enforced. Spawned from an argv array, never through a shell.
pub async fn run_git(args: &[&str], cwd: &Path, timeout: Duration) -> GitResult<GitOutput> {
    debug!("git: {:?} (cwd={})", args, cwd.display());
    let child = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let command = args.first().copied().unwrap_or("").to_string();
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(Error::Timeout {
                command,
                secs: timeout.as_secs(),
            });
        }
    };

    Ok(GitOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Like [`run_git`] but a non-zero exit becomes [`Error::CommandFailed`].
pub async fn run_git_checked(
    args: &[&str],
    cwd: &Path,
    timeout: Duration,
) -> GitResult<GitOutput> {
    let out = run_git(args, cwd, timeout).await?;
    if out.success() {
        Ok(out)
    } else {
        Err(Error::CommandFailed {
            command: args.join(" "),
            status: Some(out.status),
            stdout: out.stdout,
            stderr: out.stderr.trim().to_string(),
        })
    }
}
