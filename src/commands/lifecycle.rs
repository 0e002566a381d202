//! Change lifecycle: `submit`, `abandon`, `restore`, `rebase`.

use gerrit_api::types::ChangeInfo;
use serde_json::json;

use crate::commands::{Context, EXIT_OK};
use crate::error::CliResult;
use crate::output::{self, OutputFormat, json, xml::XmlDoc};

/// Why a change cannot be submitted right now.
fn submit_blockers(change: &ChangeInfo) -> Vec<String> {
    let mut reasons = Vec::new();
    if change.status != "NEW" {
        reasons.push(format!("status is {} (must be NEW)", change.status));
    }
    if change.work_in_progress == Some(true) {
        reasons.push("change is marked work-in-progress".to_string());
    }
    let labels = change.labels.as_ref();
    let approved = |name: &str| {
        labels
            .and_then(|l| l.get(name))
            .map(|l| l.approved.is_some())
            .unwrap_or(false)
    };
    if !approved("Code-Review") {
        reasons.push("missing Code-Review+2".to_string());
    }
    if !approved("Verified") {
        reasons.push("missing Verified+1".to_string());
    }
    reasons
}

/// `gerrit submit <change>`: precheck, then POST /submit.
pub async fn run_submit(ctx: &Context, change: String) -> CliResult<i32> {
    let resolved = ctx.resolve_change(Some(&change))?;
    let info = ctx
        .client
        .get_change(&resolved.id, &["LABELS", "DETAILED_LABELS", "SUBMITTABLE"])
        .await?;

    if info.submittable == Some(false) {
        let reasons = submit_blockers(&info);
        let rendered = match ctx.format {
            OutputFormat::Text => {
                let mut out = format!("change {} is not submittable:\n", info.number);
                for r in &reasons {
                    out.push_str(&format!("  - {r}\n"));
                }
                out
            }
            OutputFormat::Json => json::success_with(
                "submit",
                json!({ "submitted": false, "reasons": reasons }),
            ),
            OutputFormat::Xml => {
                let mut doc = XmlDoc::new("result");
                doc.attr_on_root("status", "success");
                doc.leaf("submitted", "false");
                doc.open("reasons");
                for r in &reasons {
                    doc.leaf_cdata("reason", r);
                }
                doc.close();
                doc.finish()
            }
        };
        output::write_stdout(&rendered).await?;
        return Ok(1);
    }

    let submitted = ctx.client.submit_change(&resolved.id).await?;
    render_outcome(ctx, "submitted", &submitted).await
}

pub async fn run_abandon(
    ctx: &Context,
    change: String,
    message: Option<String>,
) -> CliResult<i32> {
    let resolved = ctx.resolve_change(Some(&change))?;
    let info = ctx
        .client
        .abandon_change(&resolved.id, message.as_deref())
        .await?;
    render_outcome(ctx, "abandoned", &info).await
}

pub async fn run_restore(
    ctx: &Context,
    change: String,
    message: Option<String>,
) -> CliResult<i32> {
    let resolved = ctx.resolve_change(Some(&change))?;
    let info = ctx
        .client
        .restore_change(&resolved.id, message.as_deref())
        .await?;
    render_outcome(ctx, "restored", &info).await
}

pub async fn run_rebase(
    ctx: &Context,
    change: Option<String>,
    base: Option<String>,
) -> CliResult<i32> {
    let resolved = ctx.resolve_change(change.as_deref())?;
    let info = ctx
        .client
        .rebase_change(&resolved.id, base.as_deref())
        .await?;
    render_outcome(ctx, "rebased", &info).await
}

async fn render_outcome(ctx: &Context, verb: &str, change: &ChangeInfo) -> CliResult<i32> {
    let rendered = match ctx.format {
        OutputFormat::Text => format!("{verb} change {} ({})", change.number, change.status),
        OutputFormat::Json => json::success_with(
            "change",
            json!({ "number": change.number, "status": change.status, "action": verb }),
        ),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            doc.open_attrs(
                "change",
                &[
                    ("number", change.number.to_string().as_str()),
                    ("status", change.status.as_str()),
                ],
            );
            doc.leaf("action", verb);
            doc.close();
            doc.finish()
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gerrit_api::types::{AccountInfo, LabelInfo};
    use std::collections::BTreeMap;

    fn change(status: &str, wip: bool, cr: bool, verified: bool) -> ChangeInfo {
        let mut labels = BTreeMap::new();
        let approver = |yes: bool| {
            yes.then(|| AccountInfo {
                name: Some("ci".to_string()),
                ..Default::default()
            })
        };
        labels.insert(
            "Code-Review".to_string(),
            LabelInfo {
                approved: approver(cr),
                ..Default::default()
            },
        );
        labels.insert(
            "Verified".to_string(),
            LabelInfo {
                approved: approver(verified),
                ..Default::default()
            },
        );
        ChangeInfo {
            status: status.to_string(),
            work_in_progress: Some(wip),
            labels: Some(labels),
            ..Default::default()
        }
    }

    #[test]
    fn blockers_accumulate() {
        let reasons = submit_blockers(&change("MERGED", true, false, false));
        assert_eq!(reasons.len(), 4);
        assert!(reasons[0].contains("MERGED"));
    }

    #[test]
    fn ready_change_has_no_blockers() {
        assert!(submit_blockers(&change("NEW", false, true, true)).is_empty());
    }
}
