//! `checkout`: fetch a patchset and put it in the working tree.
//!
//! Non-detached checkouts live on a `review/<number>` branch that is reset
//! hard to FETCH_HEAD on every checkout; upstream tracking to the change's
//! target branch is attempted but never fatal.

use serde_json::json;
use tracing::{debug, warn};

use crate::commands::{Context, EXIT_OK};
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat, json, xml::XmlDoc};
use crate::resolver::ResolvedChange;

pub async fn run(
    ctx: &Context,
    change: String,
    detach: bool,
    remote: Option<String>,
) -> CliResult<i32> {
    // 1. Parse: URL, NNN/M shorthand, or plain identifier.
    let resolved = match gerrit_api::ident::parse_change_patchset_shorthand(&change) {
        Some(u) => ResolvedChange {
            id: u.number.to_string(),
            number: Some(u.number),
            patchset: u.patchset,
        },
        None => ctx.resolve_change(Some(&change))?,
    };

    // 2. Repository check.
    if !git_ops::repo::is_in_repo(&ctx.cwd) {
        return Err(CliError::Git(git_ops::Error::NotARepo));
    }

    // 3. Change + revision.
    let info = ctx
        .client
        .get_change(&resolved.id, &["CURRENT_REVISION"])
        .await?;
    let revision = match resolved.patchset {
        Some(ps) => ctx.client.get_revision(&resolved.id, Some(ps)).await?,
        None => match info.current_revision_info() {
            Some(r) => r.clone(),
            None => ctx.client.get_revision(&resolved.id, None).await?,
        },
    };

    // 4. Ref validation before any git invocation.
    git_ops::validate::ensure_change_ref(&revision.git_ref)?;

    // 5. Remote.
    let remotes = git_ops::repo::list_remotes(&ctx.cwd)?;
    let remote = match remote {
        Some(r) => r,
        None => git_ops::repo::find_matching_remote(&remotes, &ctx.creds.host)
            .unwrap_or_else(|| "origin".to_string()),
    };
    git_ops::validate::ensure_remote_name(&remote)?;

    // 6. Review branch.
    let branch = format!("review/{}", info.number);
    git_ops::validate::ensure_branch_name(&branch)?;

    // 7. Fetch.
    debug!("checkout: fetch {} {} via {remote}", revision.git_ref, info.number);
    git_ops::ops::fetch_ref(&ctx.cwd, &remote, &revision.git_ref).await?;

    // 8. Materialize.
    if detach {
        git_ops::ops::checkout_fetch_head(&ctx.cwd).await?;
    } else {
        if git_ops::ops::branch_exists(&ctx.cwd, &branch).await? {
            let on_it = git_ops::repo::current_branch(&ctx.cwd)?
                .map(|b| b == branch)
                .unwrap_or(false);
            if !on_it {
                git_ops::ops::checkout_branch(&ctx.cwd, &branch).await?;
            }
            git_ops::ops::reset_hard_fetch_head(&ctx.cwd).await?;
        } else {
            git_ops::ops::create_branch_from_fetch_head(&ctx.cwd, &branch).await?;
        }
        // Soft-fail: tracking is a convenience, not a requirement.
        if let Err(e) =
            git_ops::ops::set_upstream(&ctx.cwd, &branch, &remote, &info.branch).await
        {
            warn!("checkout: could not set upstream to {remote}/{}: {e}", info.branch);
        }
    }

    let patchset = revision.number;
    let rendered = match ctx.format {
        OutputFormat::Text => {
            if detach {
                format!(
                    "checked out change {} patchset {patchset} (detached HEAD)",
                    info.number
                )
            } else {
                format!(
                    "checked out change {} patchset {patchset} on {branch}",
                    info.number
                )
            }
        }
        OutputFormat::Json => json::success_with(
            "checkout",
            json!({
                "change": info.number,
                "patchset": patchset,
                "branch": if detach { json!(null) } else { json!(branch) },
                "detached": detach,
            }),
        ),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            doc.leaf("change", &info.number.to_string());
            doc.leaf("patchset", &patchset.to_string());
            if !detach {
                doc.leaf("branch", &branch);
            }
            doc.leaf("detached", if detach { "true" } else { "false" });
            doc.finish()
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}
