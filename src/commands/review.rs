//! `review`: AI-assisted review with confirm-then-post.
//!
//! The orchestration (worktree, prompts, tool, validation) lives in the
//! `ai-review` crate; this command wires it to credentials, renders the
//! drafts, asks for confirmation and posts.

use std::collections::BTreeMap;
use std::io::Write;

use ai_review::response::InlineDraft;
use ai_review::{ReviewOutput, ReviewRequest, generate_review};
use gerrit_api::types::{CommentInput, CommentRange, ReviewInput};
use serde_json::json;
use tracing::{debug, warn};

use crate::commands::{Context, EXIT_OK};
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat, json, text, xml::XmlDoc};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    ctx: &Context,
    change: String,
    comment: bool,
    yes: bool,
    debug_mode: bool,
    prompt: Option<String>,
    tool: Option<String>,
    system_prompt: Option<String>,
) -> CliResult<i32> {
    let resolved = ctx.resolve_change(Some(&change))?;
    if !git_ops::repo::is_in_repo(&ctx.cwd) {
        return Err(CliError::Git(git_ops::Error::NotARepo));
    }

    let remotes = git_ops::repo::list_remotes(&ctx.cwd)?;
    let remote = git_ops::repo::find_matching_remote(&remotes, &ctx.creds.host)
        .unwrap_or_else(|| "origin".to_string());

    // Explicit --tool wins, then the configured preference; with neither,
    // discovery probes the default list.
    let tool = tool.or_else(|| ctx.creds.ai_tool.clone());

    let request = ReviewRequest {
        id: resolved.id.clone(),
        tool,
        user_prompt: prompt,
        system_prompt,
        remote,
    };
    if debug_mode {
        debug!("review: request {request:?}");
    }

    let review = generate_review(&ctx.client, &ctx.cwd, &request).await?;
    for w in &review.warnings {
        warn!("review: {w}");
    }

    let rendered = render(ctx.format, &review);
    output::write_stdout(&rendered).await?;

    if !comment {
        return Ok(EXIT_OK);
    }
    if review.inline.is_empty() && review.overall.is_empty() {
        return Ok(EXIT_OK);
    }

    if !yes && !confirm("Post this review to Gerrit? [y/N] ")? {
        output::write_stdout("review not posted").await?;
        return Ok(EXIT_OK);
    }

    post_review(ctx, &resolved.id, &review).await?;
    output::write_stdout("review posted").await?;
    Ok(EXIT_OK)
}

/// Post inline drafts as one batched review, then the overall text as a
/// plain comment. Posting failures surface; partial postings stay.
async fn post_review(ctx: &Context, id: &str, review: &ReviewOutput) -> CliResult<()> {
    if !review.inline.is_empty() {
        let mut comments: BTreeMap<String, Vec<CommentInput>> = BTreeMap::new();
        for draft in &review.inline {
            comments
                .entry(draft.file.clone())
                .or_default()
                .push(to_comment_input(draft));
        }
        let input = ReviewInput {
            comments: Some(comments),
            ..Default::default()
        };
        ctx.client.post_review(id, "current", &input).await?;
    }
    if !review.overall.is_empty() {
        let input = ReviewInput {
            message: Some(review.overall.clone()),
            ..Default::default()
        };
        ctx.client.post_review(id, "current", &input).await?;
    }
    Ok(())
}

fn to_comment_input(draft: &InlineDraft) -> CommentInput {
    CommentInput {
        line: draft.line,
        range: draft.range.as_ref().map(|r| CommentRange {
            start_line: r.start_line,
            end_line: r.end_line,
            start_character: None,
            end_character: None,
        }),
        message: draft.message.clone(),
        ..Default::default()
    }
}

/// One-shot confirmation prompt on stderr/stdin.
fn confirm(question: &str) -> CliResult<bool> {
    eprint!("{question}");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn render(format: OutputFormat, review: &ReviewOutput) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&text::section(&format!(
                "AI review of change {} (tool: {})",
                review.change.number, review.tool
            )));
            out.push('\n');
            if review.inline.is_empty() {
                out.push_str("no inline comments\n");
            } else {
                for d in &review.inline {
                    let location = match (&d.line, &d.range) {
                        (Some(line), _) => format!("{}:{line}", d.file),
                        (None, Some(r)) => {
                            format!("{}:{}-{}", d.file, r.start_line, r.end_line)
                        }
                        (None, None) => d.file.clone(),
                    };
                    out.push_str(&format!("{location}\n  {}\n", d.message));
                }
            }
            if !review.overall.is_empty() {
                out.push('\n');
                out.push_str(&text::section("Overall"));
                out.push('\n');
                out.push_str(&review.overall);
                out.push('\n');
            }
            for w in &review.warnings {
                out.push_str(&format!("warning: {w}\n"));
            }
            out
        }
        OutputFormat::Json => {
            let mut fields = serde_json::Map::new();
            fields.insert("change".to_string(), json!(review.change.number));
            fields.insert("tool".to_string(), json!(review.tool));
            fields.insert("inline".to_string(), json!(review.inline));
            fields.insert("overall".to_string(), json!(review.overall));
            if !review.warnings.is_empty() {
                fields.insert("warnings".to_string(), json!(review.warnings));
            }
            json::success(fields)
        }
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            doc.open_attrs(
                "review",
                &[
                    ("change", review.change.number.to_string().as_str()),
                    ("tool", review.tool.as_str()),
                ],
            );
            for d in &review.inline {
                doc.open_attrs("comment", &[("file", d.file.as_str())]);
                if let Some(line) = d.line {
                    doc.leaf("line", &line.to_string());
                }
                if let Some(r) = &d.range {
                    doc.leaf("range", &format!("{}-{}", r.start_line, r.end_line));
                }
                doc.leaf_cdata("message", &d.message);
                doc.close();
            }
            if !review.overall.is_empty() {
                doc.leaf_cdata("overall", &review.overall);
            }
            doc.close();
            doc.finish()
        }
    }
}
