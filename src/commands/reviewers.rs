//! `add-reviewer` / `remove-reviewer` with per-principal aggregation.

use gerrit_api::types::ReviewerInput;
use serde_json::json;
use tracing::debug;

use crate::commands::{Context, EXIT_OK};
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat, json, xml::XmlDoc};

const NOTIFY_VALUES: &[&str] = &["NONE", "OWNER", "OWNER_REVIEWERS", "ALL"];

/// Normalize `--notify` or reject it.
fn normalize_notify(raw: Option<&str>) -> CliResult<Option<String>> {
    match raw {
        None => Ok(None),
        Some(v) => {
            let upper = v.to_ascii_uppercase();
            if NOTIFY_VALUES.contains(&upper.as_str()) {
                Ok(Some(upper))
            } else {
                Err(CliError::Validation(format!(
                    "--notify must be one of {}",
                    NOTIFY_VALUES.join(", ")
                )))
            }
        }
    }
}

/// Outcome for one principal.
#[derive(Debug, serde::Serialize)]
struct PrincipalResult {
    principal: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

pub async fn run_add(
    ctx: &Context,
    principals: Vec<String>,
    change: Option<String>,
    cc: bool,
    group: bool,
    notify: Option<String>,
) -> CliResult<i32> {
    if principals.is_empty() {
        return Err(CliError::Validation("no reviewers given".to_string()));
    }
    // UX guardrail: a group identifier is never an email address.
    if group {
        if let Some(bad) = principals.iter().find(|p| p.contains('@')) {
            return Err(CliError::Validation(format!(
                "--group expects group identifiers, but `{bad}` looks like an email address"
            )));
        }
    }
    let notify = normalize_notify(notify.as_deref())?;
    let resolved = ctx.resolve_change(change.as_deref())?;
    let state = if cc { "CC" } else { "REVIEWER" };

    let mut results = Vec::with_capacity(principals.len());
    for principal in &principals {
        let input = ReviewerInput {
            reviewer: principal.clone(),
            state: Some(state.to_string()),
            notify: notify.clone(),
        };
        let outcome = ctx.client.add_reviewer(&resolved.id, &input).await;
        results.push(match outcome {
            Ok(r) if r.error.is_none() => PrincipalResult {
                principal: principal.clone(),
                ok: true,
                detail: None,
            },
            Ok(r) => PrincipalResult {
                principal: principal.clone(),
                ok: false,
                detail: r.error,
            },
            Err(e) => PrincipalResult {
                principal: principal.clone(),
                ok: false,
                detail: Some(e.to_string()),
            },
        });
    }
    debug!(
        "add-reviewer: {}/{} succeeded",
        results.iter().filter(|r| r.ok).count(),
        results.len()
    );
    render_results(ctx, "added", &results).await
}

pub async fn run_remove(
    ctx: &Context,
    principals: Vec<String>,
    change: Option<String>,
    notify: Option<String>,
) -> CliResult<i32> {
    if principals.is_empty() {
        return Err(CliError::Validation("no reviewers given".to_string()));
    }
    let notify = normalize_notify(notify.as_deref())?;
    let resolved = ctx.resolve_change(change.as_deref())?;

    let mut results = Vec::with_capacity(principals.len());
    for principal in &principals {
        let outcome = ctx
            .client
            .remove_reviewer(&resolved.id, principal, notify.as_deref())
            .await;
        results.push(PrincipalResult {
            principal: principal.clone(),
            ok: outcome.is_ok(),
            detail: outcome.err().map(|e| e.to_string()),
        });
    }
    render_results(ctx, "removed", &results).await
}

async fn render_results(
    ctx: &Context,
    verb: &str,
    results: &[PrincipalResult],
) -> CliResult<i32> {
    let all_ok = results.iter().all(|r| r.ok);
    let rendered = match ctx.format {
        OutputFormat::Text => {
            let mut out = String::new();
            for r in results {
                if r.ok {
                    out.push_str(&format!("{verb} {}\n", r.principal));
                } else {
                    out.push_str(&format!(
                        "failed {}: {}\n",
                        r.principal,
                        r.detail.as_deref().unwrap_or("unknown error")
                    ));
                }
            }
            out
        }
        OutputFormat::Json => json::success_with("results", json!(results)),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            for r in results {
                doc.open_attrs(
                    "principal",
                    &[("name", r.principal.as_str()), ("ok", if r.ok { "true" } else { "false" })],
                );
                if let Some(d) = &r.detail {
                    doc.leaf_cdata("detail", d);
                }
                doc.close();
            }
            doc.finish()
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(if all_ok { EXIT_OK } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_normalization() {
        assert_eq!(normalize_notify(Some("owner")).unwrap().as_deref(), Some("OWNER"));
        assert_eq!(
            normalize_notify(Some("owner_reviewers")).unwrap().as_deref(),
            Some("OWNER_REVIEWERS")
        );
        assert!(normalize_notify(Some("everyone")).is_err());
        assert_eq!(normalize_notify(None).unwrap(), None);
    }
}
