//! AI-assisted review orchestration.
//!
//! Single high-level entry to produce a review for one change:
//!
//! 1) **Stage 1 — context fetch**
//!    - change metadata, inline comments and review messages are fetched
//!      concurrently from Gerrit
//! 2) **Stage 2 — worktree**
//!    - the patchset ref is fetched and checked out into an ephemeral
//!      worktree (unique path; removed on every exit path)
//! 3) **Stage 3 — inline pass**
//!    - structured prompt → tool on stdin → `<response>` JSON array →
//!      validation and path repair
//! 4) **Stage 4 — overall pass**
//!    - narrative prompt → tool → plain text review
//!
//! Posting is intentionally not done here: the command layer owns
//! confirm-then-post so interactive prompting stays out of this crate.
//!
//! Emits `DEBUG` logs per sub-stage and one `INFO` summary, and avoids
//! `async-trait` and heap trait objects; dispatch is plain functions.

pub mod errors;
pub mod prompt;
pub mod response;
pub mod tools;
pub mod worktree;

use std::path::Path;
use std::time::Instant;

use gerrit_api::GerritClient;
use gerrit_api::types::{ChangeInfo, CommentInfo};
use tracing::{debug, info};

use errors::ReviewResult;
use prompt::{ChangeContext, build_inline_prompt, build_overall_prompt, filter_review_messages};
use response::{InlineDraft, extract_response_payload, parse_draft_array, validate_and_repair};
use tools::{ReviewTool, discover, run_tool};
use worktree::WorktreeSession;

/// Inputs of one review run.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    /// REST identifier of the change (number preferred).
    pub id: String,
    /// Explicit tool preference (`--tool` or config), if any.
    pub tool: Option<String>,
    /// Replacement for the default prompt preamble.
    pub user_prompt: Option<String>,
    /// Extra instructions appended to both prompts.
    pub system_prompt: Option<String>,
    /// Remote used to fetch the patchset ref.
    pub remote: String,
}

/// Everything the command layer needs to print and post.
#[derive(Debug)]
pub struct ReviewOutput {
    pub change: ChangeInfo,
    pub revision_sha: String,
    pub inline: Vec<InlineDraft>,
    pub overall: String,
    pub warnings: Vec<String>,
    pub tool: String,
}

/// Run all stages and return drafts ready for confirm-then-post.
pub async fn generate_review(
    client: &GerritClient,
    repo_root: &Path,
    req: &ReviewRequest,
) -> ReviewResult<ReviewOutput> {
    let t0 = Instant::now();
    let tool = discover(req.tool.as_deref())?;
    debug!("review: stage1 fetch context for change {}", req.id);

    let (change, comments, messages) = tokio::try_join!(
        client.get_change(&req.id, &["CURRENT_REVISION", "CURRENT_COMMIT", "DETAILED_ACCOUNTS"]),
        client.get_comments(&req.id),
        client.get_messages(&req.id),
    )?;

    let revision = change
        .current_revision_info()
        .cloned()
        .ok_or_else(|| gerrit_api::Error::Parse {
            endpoint: format!("/changes/{}", req.id),
            detail: "missing current revision".to_string(),
        })?;
    let revision_sha = change.current_revision.clone().unwrap_or_default();

    // Flatten and order comments oldest-first across files.
    let mut flat: Vec<CommentInfo> = comments.into_values().flatten().collect();
    flat.sort_by(|a, b| a.updated.cmp(&b.updated));
    let messages = filter_review_messages(&messages);
    debug!(
        "review: stage1 done ({} comments, {} messages, {} ms)",
        flat.len(),
        messages.len(),
        t0.elapsed().as_millis()
    );

    let t2 = Instant::now();
    let session =
        WorktreeSession::create(repo_root, &req.remote, &revision.git_ref, change.number).await?;
    let changed_files =
        git_ops::ops::list_changed_files(session.path(), "HEAD").await?;
    debug!(
        "review: stage2 worktree ready at {} ({} changed files, {} ms)",
        session.path().display(),
        changed_files.len(),
        t2.elapsed().as_millis()
    );

    let ctx = ChangeContext {
        change: &change,
        comments: &flat,
        messages: &messages,
        changed_files: &changed_files,
    };

    let t3 = Instant::now();
    let (inline, mut warnings) =
        run_inline_pass(&tool, &ctx, req, session.path(), &changed_files).await?;
    debug!(
        "review: stage3 inline pass done ({} drafts, {} ms)",
        inline.len(),
        t3.elapsed().as_millis()
    );

    let t4 = Instant::now();
    let overall_prompt =
        build_overall_prompt(req.user_prompt.as_deref(), req.system_prompt.as_deref(), &ctx);
    let overall_raw = run_tool(&tool, &overall_prompt, session.path()).await?;
    let overall = overall_raw.trim().to_string();
    debug!("review: stage4 overall pass done ({} ms)", t4.elapsed().as_millis());

    // Graceful removal; Drop covers the failure paths above.
    if let Err(e) = session.remove().await {
        warnings.push(format!("worktree cleanup failed: {e}"));
    }

    info!(
        "review: change {} via `{}`: {} inline drafts, {} warnings, {} ms total",
        change.number,
        tool.name,
        inline.len(),
        warnings.len(),
        t0.elapsed().as_millis()
    );

    Ok(ReviewOutput {
        change,
        revision_sha,
        inline,
        overall,
        warnings,
        tool: tool.name,
    })
}

async fn run_inline_pass(
    tool: &ReviewTool,
    ctx: &ChangeContext<'_>,
    req: &ReviewRequest,
    worktree: &Path,
    changed_files: &[String],
) -> ReviewResult<(Vec<InlineDraft>, Vec<String>)> {
    let prompt =
        build_inline_prompt(req.user_prompt.as_deref(), req.system_prompt.as_deref(), ctx);
    let stdout = run_tool(tool, &prompt, worktree).await?;
    let payload = extract_response_payload(&stdout);
    let items = parse_draft_array(payload)?;
    Ok(validate_and_repair(items, changed_files))
}
