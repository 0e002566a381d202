//! `push`: send HEAD for review.
//!
//! Pipeline: validate reviewer addresses → ensure a Change-Id (installing
//! the commit-msg hook if needed) → pick target branch → assemble the
//! `refs/for/...` refspec → spawn `git push` → classify the output.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use tracing::{debug, info};

use crate::commands::{Context, EXIT_OK};
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat, json, xml::XmlDoc};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref CHANGE_URL_RE: Regex =
        Regex::new(r"(?m)^\s*remote:\s+(https?://\S+/c/\S+/\+/\d+)").unwrap();
}

/// Options that end up encoded into the refspec.
#[derive(Debug, Default, Clone)]
pub struct PushOptions {
    pub topic: Option<String>,
    pub reviewers: Vec<String>,
    pub ccs: Vec<String>,
    pub wip: bool,
    pub ready: bool,
    pub private: bool,
    pub hashtags: Vec<String>,
}

#[allow(clippy::too_many_arguments)]
pub async fn run(
    ctx: &Context,
    branch: Option<String>,
    opts: PushOptions,
    remote: Option<String>,
    dry_run: bool,
) -> CliResult<i32> {
    // 1. Address validation happens before any network/VCS action.
    for addr in opts.reviewers.iter().chain(opts.ccs.iter()) {
        if !EMAIL_RE.is_match(addr) {
            return Err(CliError::Validation(format!(
                "`{addr}` is not a valid reviewer address"
            )));
        }
    }

    if !git_ops::repo::is_in_repo(&ctx.cwd) {
        return Err(CliError::Git(git_ops::Error::NotARepo));
    }

    // 2. Change-Id enforcement.
    ensure_change_id(ctx).await?;

    // 3. Remote and target branch.
    let remotes = git_ops::repo::list_remotes(&ctx.cwd)?;
    let remote = match remote {
        Some(r) => r,
        None => git_ops::repo::find_matching_remote(&remotes, &ctx.creds.host)
            .unwrap_or_else(|| "origin".to_string()),
    };
    git_ops::validate::ensure_remote_name(&remote)?;

    let branch = match branch {
        Some(b) => b,
        None => default_branch(ctx, &remote).await?,
    };
    git_ops::validate::ensure_branch_name(&branch)?;

    // 4. Refspec.
    let refspec = assemble_refspec(&branch, &opts);
    debug!("push: {remote} HEAD:{refspec} (dry_run={dry_run})");

    // 5. Spawn git push.
    let out = git_ops::ops::push(&ctx.cwd, &remote, &refspec, dry_run).await?;

    // 6. Classify.
    let combined = out.combined();
    if out.success() {
        let url = CHANGE_URL_RE
            .captures(&combined)
            .map(|c| c[1].to_string());
        if let Some(u) = &url {
            info!("push: change at {u}");
        }
        let rendered = match ctx.format {
            OutputFormat::Text => match &url {
                Some(u) => format!("pushed to {remote} ({refspec})\n{u}"),
                None => format!("pushed to {remote} ({refspec})"),
            },
            OutputFormat::Json => json::success_with(
                "push",
                json!({ "remote": remote, "refspec": refspec, "url": url, "dry_run": dry_run }),
            ),
            OutputFormat::Xml => {
                let mut doc = XmlDoc::new("result");
                doc.attr_on_root("status", "success");
                doc.leaf("remote", &remote);
                doc.leaf("refspec", &refspec);
                doc.leaf_opt("url", url.as_deref());
                doc.finish()
            }
        };
        output::write_stdout(&rendered).await?;
        return Ok(EXIT_OK);
    }

    // "no new changes" is a benign outcome, not a failure.
    if combined.contains("no new changes") {
        let rendered = match ctx.format {
            OutputFormat::Text => "no new changes to push".to_string(),
            OutputFormat::Json => {
                json::success_with("push", json!({ "up_to_date": true }))
            }
            OutputFormat::Xml => {
                let mut doc = XmlDoc::new("result");
                doc.attr_on_root("status", "success");
                doc.leaf("up_to_date", "true");
                doc.finish()
            }
        };
        output::write_stdout(&rendered).await?;
        return Ok(EXIT_OK);
    }

    Err(CliError::Validation(classify_push_failure(&combined)))
}

/// Ensure HEAD carries a Change-Id footer, provisioning the commit-msg hook
/// and amending once when needed.
async fn ensure_change_id(ctx: &Context) -> CliResult<()> {
    if git_ops::repo::commit_has_change_id(&ctx.cwd)? {
        return Ok(());
    }
    let git_dir = git_ops::repo::git_dir(&ctx.cwd)?;
    if git_ops::hook::is_hook_installed(&git_dir) {
        return Err(CliError::Validation(
            "HEAD has no Change-Id although the commit-msg hook is installed; \
             run `git commit --amend` to let the hook add one"
                .to_string(),
        ));
    }
    info!("push: installing commit-msg hook from {}", ctx.creds.host);
    let script = ctx.client.fetch_commit_msg_hook().await?;
    git_ops::hook::install_commit_msg_hook(&git_dir, &script)?;
    // Amend with the unchanged message so the fresh hook adds the footer.
    git_ops::ops::amend_keep_message(&ctx.cwd).await?;
    if !git_ops::repo::commit_has_change_id(&ctx.cwd)? {
        return Err(CliError::Validation(
            "commit-msg hook did not add a Change-Id; amend the commit manually".to_string(),
        ));
    }
    Ok(())
}

/// Tracking branch, else `main` when it exists on the remote, else `master`.
async fn default_branch(ctx: &Context, remote: &str) -> CliResult<String> {
    if let Some((_, branch)) = git_ops::repo::tracking_branch(&ctx.cwd)? {
        return Ok(branch);
    }
    if git_ops::ops::remote_branch_exists(&ctx.cwd, remote, "main").await? {
        return Ok("main".to_string());
    }
    Ok("master".to_string())
}

/// `refs/for/<branch>` plus `%`-options, `,`-joined.
fn assemble_refspec(branch: &str, opts: &PushOptions) -> String {
    let mut options: Vec<String> = Vec::new();
    if let Some(topic) = &opts.topic {
        options.push(format!("topic={}", urlencoding::encode(topic)));
    }
    if opts.wip {
        options.push("wip".to_string());
    }
    if opts.ready {
        options.push("ready".to_string());
    }
    if opts.private {
        options.push("private".to_string());
    }
    for r in &opts.reviewers {
        options.push(format!("r={r}"));
    }
    for cc in &opts.ccs {
        options.push(format!("cc={cc}"));
    }
    for tag in &opts.hashtags {
        options.push(format!("hashtag={}", urlencoding::encode(tag)));
    }

    if options.is_empty() {
        format!("refs/for/{branch}")
    } else {
        format!("refs/for/{branch}%{}", options.join(","))
    }
}

/// Map well-known push failures to actionable messages; fall back to the
/// raw combined output.
fn classify_push_failure(combined: &str) -> String {
    let lower = combined.to_lowercase();
    if lower.contains("authentication failed") || lower.contains("could not read username") {
        return "push rejected: authentication failed; check your credentials \
                or SSH key for this remote"
            .to_string();
    }
    if combined.contains("prohibited by Gerrit") {
        return "push rejected by Gerrit: you may lack push permission for \
                this ref; ask a project owner"
            .to_string();
    }
    format!("git push failed:\n{}", combined.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refspec_encoding_matches_conventions() {
        let opts = PushOptions {
            topic: Some("feat".to_string()),
            reviewers: vec!["alice@ex.com".to_string()],
            wip: true,
            ..Default::default()
        };
        assert_eq!(
            assemble_refspec("main", &opts),
            "refs/for/main%topic=feat,wip,r=alice@ex.com"
        );
    }

    #[test]
    fn refspec_without_options_is_bare() {
        assert_eq!(
            assemble_refspec("master", &PushOptions::default()),
            "refs/for/master"
        );
    }

    #[test]
    fn topic_and_hashtags_are_url_encoded() {
        let opts = PushOptions {
            topic: Some("two words".to_string()),
            hashtags: vec!["a/b".to_string()],
            ..Default::default()
        };
        let refspec = assemble_refspec("main", &opts);
        assert!(refspec.contains("topic=two%20words"));
        assert!(refspec.contains("hashtag=a%2Fb"));
    }

    #[test]
    fn change_url_is_extracted_from_push_output() {
        let out = "Enumerating objects: 5, done.\n\
                   remote: \n\
                   remote:   https://g.example/c/proj/+/4711 feat: thing\n";
        let url = CHANGE_URL_RE.captures(out).map(|c| c[1].to_string());
        assert_eq!(url.as_deref(), Some("https://g.example/c/proj/+/4711"));
    }

    #[test]
    fn email_validation() {
        assert!(EMAIL_RE.is_match("alice@ex.com"));
        assert!(!EMAIL_RE.is_match("alice"));
        assert!(!EMAIL_RE.is_match("alice@host"));
        assert!(!EMAIL_RE.is_match("a b@ex.com"));
    }

    #[test]
    fn failure_classification() {
        assert!(classify_push_failure("fatal: Authentication failed for ...")
            .contains("authentication failed"));
        assert!(classify_push_failure("! [remote rejected] prohibited by Gerrit")
            .contains("push permission"));
        assert!(classify_push_failure("something odd").contains("something odd"));
    }
}
