//! AI tool discovery and invocation.
//!
//! The orchestrator drives an external CLI: the prompt goes to stdin, the
//! review comes back on stdout. Discovery probes PATH for a fixed
//! preference list; an explicit user preference is honored first.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{Error, ReviewResult};

/// Probe order when the user expressed no preference.
pub const DEFAULT_TOOLS: &[&str] = &["claude", "llm", "opencode", "gemini"];

/// Generation can legitimately take minutes on large changes.
const TOOL_TIMEOUT: Duration = Duration::from_secs(600);

/// A usable review tool resolved on PATH.
#[derive(Debug, Clone)]
pub struct ReviewTool {
    pub name: String,
    pub path: PathBuf,
}

impl ReviewTool {
    /// Non-interactive invocation arguments per known tool.
    fn args(&self) -> &'static [&'static str] {
        match self.name.as_str() {
            "claude" => &["-p"],
            "opencode" => &["run"],
            _ => &[],
        }
    }
}

/// Resolve the review tool: the explicit preference if given, otherwise the
/// first entry of [`DEFAULT_TOOLS`] present on PATH.
pub fn discover(preference: Option<&str>) -> ReviewResult<ReviewTool> {
    if let Some(name) = preference {
        return match which::which(name) {
            Ok(path) => Ok(ReviewTool {
                name: name.to_string(),
                path,
            }),
            Err(_) => Err(Error::ToolNotFound(name.to_string())),
        };
    }
    for name in DEFAULT_TOOLS {
        if let Ok(path) = which::which(name) {
            debug!("ai: using tool `{}` at {}", name, path.display());
            return Ok(ReviewTool {
                name: (*name).to_string(),
                path,
            });
        }
    }
    Err(Error::ToolNotFound(DEFAULT_TOOLS.join(", ")))
}

/// Run the tool with `prompt` on stdin inside `cwd`, returning stdout.
///
/// Non-zero exit or empty stdout is a stage failure; the stderr tail is
/// attached so the user sees the tool's own diagnostics.
pub async fn run_tool(tool: &ReviewTool, prompt: &str, cwd: &Path) -> ReviewResult<String> {
    debug!(
        "ai: spawn {} ({} prompt chars, cwd={})",
        tool.name,
        prompt.chars().count(),
        cwd.display()
    );
    let mut child = Command::new(&tool.path)
        .args(tool.args())
        .current_dir(cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::ToolFailed {
            tool: tool.name.clone(),
            detail: format!("spawn failed: {e}"),
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(prompt.as_bytes()).await?;
        // Close stdin so the tool knows the prompt is complete.
        drop(stdin);
    }

    let output = match tokio::time::timeout(TOOL_TIMEOUT, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(Error::ToolFailed {
                tool: tool.name.clone(),
                detail: format!("timed out after {}s", TOOL_TIMEOUT.as_secs()),
            });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: String = stderr
            .lines()
            .rev()
            .take(5)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect::<Vec<_>>()
            .join("\n");
        return Err(Error::ToolFailed {
            tool: tool.name.clone(),
            detail: format!(
                "exit {}: {}",
                output.status.code().unwrap_or(-1),
                tail.trim()
            ),
        });
    }
    if stdout.trim().is_empty() {
        return Err(Error::EmptyResponse);
    }
    Ok(stdout)
}
