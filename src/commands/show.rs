//! `show`: one change in full detail.

use gerrit_api::types::{ChangeInfo, LabelInfo};
use serde_json::json;
use tracing::debug;

use crate::commands::{Context, EXIT_OK};
use crate::error::CliResult;
use crate::output::{self, OutputFormat, json, text, xml::XmlDoc};

pub async fn run(ctx: &Context, change: Option<String>) -> CliResult<i32> {
    let resolved = ctx.resolve_change(change.as_deref())?;
    let mut change = ctx
        .client
        .get_change(
            &resolved.id,
            &["CURRENT_REVISION", "CURRENT_COMMIT", "LABELS", "DETAILED_ACCOUNTS"],
        )
        .await?;

    // The plain change endpoint often omits reviewer data; fall back to a
    // targeted search that carries the reviewer options.
    if change.reviewers.is_none() {
        debug!("show: reviewers missing, fetching via change query");
        let query = format!("change:{}", change.change_id);
        let mut listed = ctx
            .client
            .list_changes_with_options(&query, &["DETAILED_LABELS", "DETAILED_ACCOUNTS"])
            .await?;
        if let Some(full) = listed.drain(..).next() {
            change.reviewers = full.reviewers;
            if change.labels.is_none() {
                change.labels = full.labels;
            }
        }
    }

    let rendered = render(ctx, &change);
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}

fn render(ctx: &Context, c: &ChangeInfo) -> String {
    match ctx.format {
        OutputFormat::Json => json::success_with("change", json!(c)),
        OutputFormat::Xml => render_xml(c),
        OutputFormat::Text => render_text(ctx, c),
    }
}

fn label_summary(name: &str, label: &LabelInfo) -> String {
    let mut parts = Vec::new();
    if let Some(a) = &label.approved {
        parts.push(format!("+{}", a.display()));
    }
    if let Some(r) = &label.rejected {
        parts.push(format!("-{}", r.display()));
    }
    if let Some(v) = label.value {
        parts.push(format!("value {v:+}"));
    }
    if parts.is_empty() {
        format!("{name}: -")
    } else {
        format!("{name}: {}", parts.join(", "))
    }
}

fn render_text(ctx: &Context, c: &ChangeInfo) -> String {
    let mut out = String::new();
    out.push_str(&text::section(&format!("{} — {}", c.number, c.subject)));
    out.push('\n');
    out.push_str(&text::field("Status", &c.status));
    out.push('\n');
    out.push_str(&text::field("Project", &c.project));
    out.push('\n');
    out.push_str(&text::field("Branch", &c.branch));
    out.push('\n');
    if let Some(topic) = &c.topic {
        out.push_str(&text::field("Topic", topic));
        out.push('\n');
    }
    if let Some(owner) = &c.owner {
        out.push_str(&text::field("Owner", &owner.display()));
        out.push('\n');
    }
    if let Some(updated) = &c.updated {
        out.push_str(&text::field("Updated", &text::short_date(updated)));
        out.push('\n');
    }
    if c.work_in_progress == Some(true) {
        out.push_str(&text::field("WIP", "yes"));
        out.push('\n');
    }
    if let (Some(ins), Some(del)) = (c.insertions, c.deletions) {
        out.push_str(&text::field("Size", &format!("+{ins} -{del}")));
        out.push('\n');
    }
    out.push_str(&text::field(
        "URL",
        &gerrit_api::ident::format_change_url(ctx.client.host(), &c.project, c.number),
    ));
    out.push('\n');

    if let Some(labels) = &c.labels {
        out.push('\n');
        out.push_str(&text::section("Labels"));
        out.push('\n');
        for (name, label) in labels {
            out.push_str("  ");
            out.push_str(&label_summary(name, label));
            out.push('\n');
        }
    }

    if let Some(reviewers) = &c.reviewers {
        out.push('\n');
        out.push_str(&text::section("Reviewers"));
        out.push('\n');
        for r in &reviewers.reviewers {
            out.push_str(&format!("  {}\n", r.display()));
        }
        for cc in &reviewers.ccs {
            out.push_str(&format!("  {} (cc)\n", cc.display()));
        }
    }

    if let Some(message) = c
        .current_revision_info()
        .and_then(|r| r.commit.as_ref())
        .and_then(|commit| commit.message.as_deref())
    {
        out.push('\n');
        out.push_str(&text::section("Commit message"));
        out.push('\n');
        out.push_str(message.trim_end());
        out.push('\n');
    }
    out
}

fn render_xml(c: &ChangeInfo) -> String {
    let mut doc = XmlDoc::new("result");
    doc.attr_on_root("status", "success");
    doc.open_attrs(
        "change",
        &[
            ("number", c.number.to_string().as_str()),
            ("status", c.status.as_str()),
        ],
    );
    doc.leaf("change_id", &c.change_id);
    doc.leaf_cdata("subject", &c.subject);
    doc.leaf("project", &c.project);
    doc.leaf("branch", &c.branch);
    doc.leaf_opt("topic", c.topic.as_deref());
    if let Some(owner) = &c.owner {
        doc.leaf("owner", &owner.display());
    }
    doc.leaf_opt("created", c.created.as_deref());
    doc.leaf_opt("updated", c.updated.as_deref());
    if let Some(wip) = c.work_in_progress {
        doc.leaf("work_in_progress", if wip { "true" } else { "false" });
    }
    if let Some(submittable) = c.submittable {
        doc.leaf("submittable", if submittable { "true" } else { "false" });
    }

    if let Some(labels) = &c.labels {
        doc.open("labels");
        for (name, label) in labels {
            let value = label.value.map(|v| v.to_string()).unwrap_or_default();
            doc.open_attrs("label", &[("name", name.as_str()), ("value", value.as_str())]);
            if let Some(a) = &label.approved {
                doc.leaf("approved_by", &a.display());
            }
            doc.close();
        }
        doc.close();
    }

    if let Some(reviewers) = &c.reviewers {
        doc.open("reviewers");
        for r in &reviewers.reviewers {
            doc.open_attrs("reviewer", &[("state", "REVIEWER")]);
            doc.leaf("name", &r.display());
            doc.leaf_opt("email", r.email.as_deref());
            doc.close();
        }
        for r in &reviewers.ccs {
            doc.open_attrs("reviewer", &[("state", "CC")]);
            doc.leaf("name", &r.display());
            doc.leaf_opt("email", r.email.as_deref());
            doc.close();
        }
        doc.close();
    }

    if let Some(message) = c
        .current_revision_info()
        .and_then(|r| r.commit.as_ref())
        .and_then(|commit| commit.message.as_deref())
    {
        doc.leaf_cdata("commit_message", message);
    }
    doc.close();
    doc.finish()
}
