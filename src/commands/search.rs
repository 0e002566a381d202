//! Change listings: `search`, `mine`, `incoming`.

use std::collections::BTreeMap;

use gerrit_api::types::ChangeInfo;
use serde_json::json;
use tracing::debug;

use crate::commands::{Context, EXIT_OK};
use crate::error::CliResult;
use crate::output::{self, OutputFormat, json, text, xml::XmlDoc};

/// `gerrit search [query] -n <limit>`.
pub async fn run_search(ctx: &Context, query: Option<String>, limit: u32) -> CliResult<i32> {
    let base = query.unwrap_or_else(|| "is:open".to_string());
    let query = with_limit(&base, limit);
    list_and_render(ctx, &query).await
}

/// `gerrit mine`: open changes owned by the caller.
pub async fn run_mine(ctx: &Context) -> CliResult<i32> {
    list_and_render(ctx, "is:open owner:self").await
}

/// `gerrit incoming [-i]`: open changes awaiting the caller's review.
pub async fn run_incoming(ctx: &Context, ignore_wip: bool) -> CliResult<i32> {
    let query = if ignore_wip {
        "is:open reviewer:self -owner:self -is:wip"
    } else {
        "is:open reviewer:self -owner:self"
    };
    list_and_render(ctx, query).await
}

/// Append `limit:N` unless the query already carries one. Zero means the
/// server default.
fn with_limit(query: &str, limit: u32) -> String {
    if limit == 0 || query.contains("limit:") {
        query.to_string()
    } else {
        format!("{query} limit:{limit}")
    }
}

async fn list_and_render(ctx: &Context, query: &str) -> CliResult<i32> {
    debug!("search: query={query}");
    let changes = ctx.client.list_changes(query).await?;
    let grouped = group_by_project(changes);
    let rendered = render(ctx.format, &grouped);
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}

/// Group alphabetically by project; inside a project newest activity first.
fn group_by_project(changes: Vec<ChangeInfo>) -> BTreeMap<String, Vec<ChangeInfo>> {
    let mut grouped: BTreeMap<String, Vec<ChangeInfo>> = BTreeMap::new();
    for c in changes {
        grouped.entry(c.project.clone()).or_default().push(c);
    }
    for list in grouped.values_mut() {
        list.sort_by(|a, b| b.updated.cmp(&a.updated));
    }
    grouped
}

fn render(format: OutputFormat, grouped: &BTreeMap<String, Vec<ChangeInfo>>) -> String {
    match format {
        OutputFormat::Text => {
            if grouped.is_empty() {
                return "no changes found".to_string();
            }
            let mut out = String::new();
            for (project, changes) in grouped {
                out.push_str(&text::section(project));
                out.push('\n');
                for c in changes {
                    out.push_str(&text::change_line(c));
                    out.push('\n');
                }
            }
            out
        }
        OutputFormat::Json => {
            let flat: Vec<&ChangeInfo> = grouped.values().flatten().collect();
            json::success_with("changes", json!(flat))
        }
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            for (project, changes) in grouped {
                doc.open_attrs("project", &[("name", project)]);
                for c in changes {
                    change_summary_xml(&mut doc, c);
                }
                doc.close();
            }
            doc.finish()
        }
    }
}

/// Summary `<change>` element shared by the listing commands.
pub fn change_summary_xml(doc: &mut XmlDoc, c: &ChangeInfo) {
    doc.open_attrs(
        "change",
        &[
            ("number", c.number.to_string().as_str()),
            ("status", c.status.as_str()),
        ],
    );
    doc.leaf_cdata("subject", &c.subject);
    doc.leaf("branch", &c.branch);
    doc.leaf_opt("topic", c.topic.as_deref());
    if let Some(owner) = &c.owner {
        doc.leaf("owner", &owner.display());
    }
    doc.leaf_opt("updated", c.updated.as_deref());
    doc.close();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_appended_once() {
        assert_eq!(with_limit("is:open", 25), "is:open limit:25");
        assert_eq!(with_limit("owner:self limit:10", 25), "owner:self limit:10");
        assert_eq!(with_limit("is:open", 0), "is:open");
    }

    fn change(project: &str, number: u32, updated: &str) -> ChangeInfo {
        ChangeInfo {
            project: project.to_string(),
            number,
            subject: format!("change {number}"),
            status: "NEW".to_string(),
            branch: "main".to_string(),
            updated: Some(updated.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn grouping_is_alphabetical_then_updated_desc() {
        let grouped = group_by_project(vec![
            change("p-b", 1, "2026-01-01 10:00:00"),
            change("p-a", 2, "2026-01-01 10:00:00"),
            change("p-a", 3, "2026-01-02 10:00:00"),
        ]);
        let projects: Vec<&String> = grouped.keys().collect();
        assert_eq!(projects, ["p-a", "p-b"]);
        let numbers: Vec<u32> = grouped["p-a"].iter().map(|c| c.number).collect();
        assert_eq!(numbers, [3, 2]);
    }

    #[test]
    fn xml_listing_is_grouped() {
        let grouped = group_by_project(vec![change("p-a", 2, "2026-01-01 10:00:00")]);
        let out = render(OutputFormat::Xml, &grouped);
        assert!(out.contains("<project name=\"p-a\">"));
        assert!(out.contains("number=\"2\""));
    }
}
