//! `build-status`: CI state interpretation, one-shot or watch loop.
//!
//! Exit-code discipline (fixed): 0 for any observed state; with
//! `--exit-status` a terminal failure exits 1; a watch timeout exits 2;
//! unexpected errors exit 3.

use std::time::{Duration, Instant};

use gerrit_api::{BuildState, interpret};
use serde_json::json;
use tracing::debug;

use crate::commands::Context;
use crate::error::CliResult;
use crate::output::{self, OutputFormat, json, xml::XmlDoc};

pub const EXIT_TIMEOUT: i32 = 2;
pub const EXIT_UNEXPECTED: i32 = 3;

pub async fn run(
    ctx: &Context,
    change: Option<String>,
    watch: bool,
    interval: u64,
    timeout: u64,
    exit_status: bool,
) -> CliResult<i32> {
    let resolved = match ctx.resolve_change(change.as_deref()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", output::render_error(ctx.format, &e.to_string()));
            return Ok(EXIT_UNEXPECTED);
        }
    };

    if !watch {
        return match poll_state(ctx, &resolved.id).await {
            Ok(state) => {
                output::write_stdout(&render(ctx.format, state)).await?;
                Ok(exit_code_for(state, exit_status))
            }
            Err(e) => {
                eprintln!("{}", output::render_error(ctx.format, &e.to_string()));
                Ok(EXIT_UNEXPECTED)
            }
        };
    }

    let interval = Duration::from_secs(interval.max(1));
    let deadline = Duration::from_secs(timeout);
    let started = Instant::now();

    loop {
        let state = match poll_state(ctx, &resolved.id).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{}", output::render_error(ctx.format, &e.to_string()));
                return Ok(EXIT_UNEXPECTED);
            }
        };

        // One JSON state line per poll iteration, regardless of format.
        output::write_stdout(&format!("{{\"state\":\"{state}\"}}")).await?;

        match state {
            BuildState::Success | BuildState::NotFound => {
                return Ok(exit_code_for(state, exit_status));
            }
            BuildState::Failure => {
                // Give CI one more interval to flush its logs before we quit.
                tokio::time::sleep(interval).await;
                return Ok(exit_code_for(state, exit_status));
            }
            BuildState::Pending | BuildState::Running => {}
        }

        if started.elapsed() > deadline {
            eprintln!(
                "build-status: timed out after {}s waiting for a terminal state",
                deadline.as_secs()
            );
            return Ok(EXIT_TIMEOUT);
        }
        tokio::time::sleep(interval).await;
    }
}

/// One poll: fetch messages, interpret. A 404 on the change itself is the
/// `not_found` terminal state, not an error.
async fn poll_state(ctx: &Context, id: &str) -> CliResult<BuildState> {
    match ctx.client.get_change_with_messages(id).await {
        Ok(change) => {
            let messages = change.messages.unwrap_or_default();
            let state = interpret(&messages);
            debug!("build-status: {} messages -> {state}", messages.len());
            Ok(state)
        }
        Err(e) if e.is_not_found() => Ok(BuildState::NotFound),
        Err(e) => Err(e.into()),
    }
}

fn exit_code_for(state: BuildState, exit_status: bool) -> i32 {
    if exit_status && state == BuildState::Failure {
        1
    } else {
        0
    }
}

fn render(format: OutputFormat, state: BuildState) -> String {
    match format {
        OutputFormat::Text => format!("build: {state}"),
        OutputFormat::Json => json::success_with("state", json!(state.as_str())),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            doc.leaf("state", state.as_str());
            doc.finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_ci_conventions() {
        assert_eq!(exit_code_for(BuildState::Success, false), 0);
        assert_eq!(exit_code_for(BuildState::Failure, false), 0);
        assert_eq!(exit_code_for(BuildState::Failure, true), 1);
        assert_eq!(exit_code_for(BuildState::NotFound, true), 0);
    }
}
