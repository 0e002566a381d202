//! `status`: configuration, connectivity and working-tree context.

use gerrit_api::ident::change_id_from_commit_message;
use serde_json::json;

use crate::commands::{Context, EXIT_OK};
use crate::error::CliResult;
use crate::output::{self, OutputFormat, json, text, xml::XmlDoc};

pub async fn run(ctx: &Context) -> CliResult<i32> {
    let account = ctx.client.get_self_account().await;
    let authenticated = account.is_ok();
    let account_name = account.ok().map(|a| a.display());

    // Working-tree context is informational; its absence is not an error.
    let detected_change = if git_ops::repo::is_in_repo(&ctx.cwd) {
        git_ops::repo::head_commit_message(&ctx.cwd)
            .ok()
            .and_then(|m| change_id_from_commit_message(&m))
    } else {
        None
    };

    let rendered = match ctx.format {
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&text::field("Host", ctx.client.host()));
            out.push('\n');
            out.push_str(&text::field("Username", &ctx.creds.username));
            out.push('\n');
            out.push_str(&text::field(
                "Auth",
                if authenticated { "ok" } else { "failed" },
            ));
            out.push('\n');
            if let Some(name) = &account_name {
                out.push_str(&text::field("Account", name));
                out.push('\n');
            }
            if let Some(tool) = &ctx.creds.ai_tool {
                out.push_str(&text::field("AI tool", tool));
                out.push('\n');
            }
            match &detected_change {
                Some(id) => {
                    out.push_str(&text::field("HEAD change", id));
                    out.push('\n');
                }
                None => {
                    out.push_str(&text::field("HEAD change", "none detected"));
                    out.push('\n');
                }
            }
            out
        }
        OutputFormat::Json => {
            let mut fields = serde_json::Map::new();
            fields.insert("host".to_string(), json!(ctx.client.host()));
            fields.insert("username".to_string(), json!(ctx.creds.username));
            fields.insert("authenticated".to_string(), json!(authenticated));
            if let Some(name) = &account_name {
                fields.insert("account".to_string(), json!(name));
            }
            if let Some(id) = &detected_change {
                fields.insert("head_change".to_string(), json!(id));
            }
            json::success(fields)
        }
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            doc.leaf("host", ctx.client.host());
            doc.leaf("username", &ctx.creds.username);
            doc.leaf("authenticated", if authenticated { "true" } else { "false" });
            doc.leaf_opt("account", account_name.as_deref());
            doc.leaf_opt("head_change", detected_change.as_deref());
            doc.finish()
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(if authenticated { EXIT_OK } else { 1 })
}
