//! Server directory listings: `projects`, `groups`, `groups-show`,
//! `groups-members`.

use gerrit_api::types::GroupQuery;
use serde_json::json;

use crate::commands::{Context, EXIT_OK};
use crate::error::CliResult;
use crate::output::{self, OutputFormat, json, text, xml::XmlDoc};

pub async fn run_projects(ctx: &Context, pattern: Option<String>) -> CliResult<i32> {
    let projects = ctx.client.list_projects(pattern.as_deref()).await?;
    let rendered = match ctx.format {
        OutputFormat::Text => {
            if projects.is_empty() {
                "no projects".to_string()
            } else {
                let mut out = String::new();
                for (name, info) in &projects {
                    match &info.description {
                        Some(d) if !d.is_empty() => {
                            out.push_str(&format!("{name}  —  {d}\n"));
                        }
                        _ => {
                            out.push_str(name);
                            out.push('\n');
                        }
                    }
                }
                out
            }
        }
        OutputFormat::Json => json::success_with("projects", json!(projects)),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            for (name, info) in &projects {
                doc.open_attrs("project", &[("name", name.as_str())]);
                if let Some(d) = &info.description {
                    doc.leaf_cdata("description", d);
                }
                doc.leaf_opt("state", info.state.as_deref());
                doc.close();
            }
            doc.finish()
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}

pub async fn run_groups(
    ctx: &Context,
    pattern: Option<String>,
    owned: bool,
    project: Option<String>,
    user: Option<String>,
    limit: Option<u32>,
) -> CliResult<i32> {
    let query = GroupQuery {
        pattern,
        owned,
        project,
        user,
        limit,
    };
    let groups = ctx.client.list_groups(&query).await?;
    let rendered = match ctx.format {
        OutputFormat::Text => {
            if groups.is_empty() {
                "no groups".to_string()
            } else {
                let mut out = String::new();
                for (name, info) in &groups {
                    match &info.description {
                        Some(d) if !d.is_empty() => out.push_str(&format!("{name}  —  {d}\n")),
                        _ => {
                            out.push_str(name);
                            out.push('\n');
                        }
                    }
                }
                out
            }
        }
        OutputFormat::Json => json::success_with("groups", json!(groups)),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            for (name, info) in &groups {
                doc.open_attrs("group", &[("name", name.as_str()), ("id", info.id.as_str())]);
                if let Some(d) = &info.description {
                    doc.leaf_cdata("description", d);
                }
                doc.close();
            }
            doc.finish()
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}

pub async fn run_groups_show(ctx: &Context, group: String) -> CliResult<i32> {
    let info = ctx.client.get_group_detail(&group).await?;
    let rendered = match ctx.format {
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&text::section(info.name.as_deref().unwrap_or(&group)));
            out.push('\n');
            out.push_str(&text::field("Id", &info.id));
            out.push('\n');
            if let Some(d) = &info.description {
                out.push_str(&text::field("Description", d));
                out.push('\n');
            }
            if let Some(o) = &info.owner {
                out.push_str(&text::field("Owner", o));
                out.push('\n');
            }
            if let Some(members) = &info.members {
                out.push_str(&text::section("Members"));
                out.push('\n');
                for m in members {
                    out.push_str(&format!("  {}\n", m.display()));
                }
            }
            out
        }
        OutputFormat::Json => json::success_with("group", json!(info)),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            doc.open_attrs("group", &[("id", info.id.as_str())]);
            doc.leaf_opt("name", info.name.as_deref());
            if let Some(d) = &info.description {
                doc.leaf_cdata("description", d);
            }
            doc.leaf_opt("owner", info.owner.as_deref());
            if let Some(members) = &info.members {
                doc.open("members");
                for m in members {
                    doc.leaf("member", &m.display());
                }
                doc.close();
            }
            doc.close();
            doc.finish()
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}

pub async fn run_groups_members(ctx: &Context, group: String) -> CliResult<i32> {
    let members = ctx.client.get_group_members(&group).await?;
    let rendered = match ctx.format {
        OutputFormat::Text => {
            if members.is_empty() {
                "no members".to_string()
            } else {
                members
                    .iter()
                    .map(|m| {
                        let mut line = m.display();
                        if let Some(email) = &m.email {
                            line.push_str(&format!(" <{email}>"));
                        }
                        line
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        OutputFormat::Json => json::success_with("members", json!(members)),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            for m in &members {
                doc.open("member");
                doc.leaf("name", &m.display());
                doc.leaf_opt("email", m.email.as_deref());
                if let Some(id) = m.account_id {
                    doc.leaf("account_id", &id.to_string());
                }
                doc.close();
            }
            doc.finish()
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}
