//! `comments` (list) and `comment` (post).

use std::collections::BTreeMap;
use std::io::Read;

use gerrit_api::types::{CommentInfo, CommentInput, ReviewInput};
use serde_json::json;

use crate::commands::{Context, EXIT_OK};
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat, json, text, xml::XmlDoc};

/// `gerrit comments <change>`.
pub async fn run_list(ctx: &Context, change: String) -> CliResult<i32> {
    let resolved = ctx.resolve_change(Some(&change))?;
    let map = ctx.client.get_comments(&resolved.id).await?;

    // Flatten across files, oldest first.
    let mut flat: Vec<CommentInfo> = map.into_values().flatten().collect();
    flat.sort_by(|a, b| a.updated.cmp(&b.updated));

    let rendered = match ctx.format {
        OutputFormat::Json => json::success_with("comments", json!(flat)),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            doc.open("comments");
            for c in &flat {
                let unresolved = if c.unresolved == Some(true) { "true" } else { "false" };
                doc.open_attrs("comment", &[("unresolved", unresolved)]);
                doc.leaf_opt("path", c.path.as_deref());
                if let Some(line) = c.line {
                    doc.leaf("line", &line.to_string());
                }
                if let Some(r) = &c.range {
                    doc.leaf("range", &format!("{}-{}", r.start_line, r.end_line));
                }
                if let Some(a) = &c.author {
                    doc.leaf("author", &a.display());
                }
                doc.leaf_opt("updated", c.updated.as_deref());
                doc.leaf_cdata("message", &c.message);
                doc.close();
            }
            doc.close();
            doc.finish()
        }
        OutputFormat::Text => {
            if flat.is_empty() {
                "no comments".to_string()
            } else {
                let mut out = String::new();
                for c in &flat {
                    let path = c.path.as_deref().unwrap_or("?");
                    let location = match (c.line, &c.range) {
                        (Some(line), _) => format!("{path}:{line}"),
                        (None, Some(r)) => format!("{path}:{}-{}", r.start_line, r.end_line),
                        (None, None) => path.to_string(),
                    };
                    let author = c
                        .author
                        .as_ref()
                        .map(|a| a.display())
                        .unwrap_or_else(|| "unknown".to_string());
                    let marker = if c.unresolved == Some(true) { " [unresolved]" } else { "" };
                    out.push_str(&text::section(&format!("{location} — {author}{marker}")));
                    out.push('\n');
                    out.push_str(c.message.trim_end());
                    out.push_str("\n\n");
                }
                out
            }
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}

/// `gerrit comment <change> [-m msg] [--file F --line N] [--batch]`.
#[allow(clippy::too_many_arguments)]
pub async fn run_post(
    ctx: &Context,
    change: String,
    message: Option<String>,
    file: Option<String>,
    line: Option<u32>,
    unresolved: bool,
    batch: bool,
) -> CliResult<i32> {
    let resolved = ctx.resolve_change(Some(&change))?;

    let input = if batch {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        batch_input(&raw)?
    } else if let Some(path) = file {
        let line = line.ok_or_else(|| {
            CliError::Validation("--file requires --line for an inline comment".to_string())
        })?;
        let message = message.ok_or_else(|| {
            CliError::Validation("an inline comment needs -m <message>".to_string())
        })?;
        let mut comments = BTreeMap::new();
        comments.insert(
            path,
            vec![CommentInput {
                line: Some(line),
                message,
                unresolved: unresolved.then_some(true),
                ..Default::default()
            }],
        );
        ReviewInput {
            comments: Some(comments),
            ..Default::default()
        }
    } else {
        let message = message.ok_or_else(|| {
            CliError::Validation("nothing to post: pass -m, --file/--line or --batch".to_string())
        })?;
        ReviewInput {
            message: Some(message),
            ..Default::default()
        }
    };

    ctx.client.post_review(&resolved.id, "current", &input).await?;

    let rendered = match ctx.format {
        OutputFormat::Text => "comment posted".to_string(),
        OutputFormat::Json => json::success_with("posted", json!(true)),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            doc.leaf("posted", "true");
            doc.finish()
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}

/// Parse a `--batch` stdin payload: a JSON array of inline comments in the
/// same shape the AI review emits (`file` + line/range + message).
fn batch_input(raw: &str) -> CliResult<ReviewInput> {
    #[derive(serde::Deserialize)]
    struct BatchItem {
        file: String,
        #[serde(default)]
        line: Option<u32>,
        #[serde(default)]
        range: Option<gerrit_api::types::CommentRange>,
        message: String,
        #[serde(default)]
        unresolved: Option<bool>,
    }

    let items: Vec<BatchItem> = serde_json::from_str(raw)
        .map_err(|e| CliError::Validation(format!("bad batch payload: {e}")))?;
    if items.is_empty() {
        return Err(CliError::Validation("batch payload is empty".to_string()));
    }

    let mut comments: BTreeMap<String, Vec<CommentInput>> = BTreeMap::new();
    for (idx, item) in items.into_iter().enumerate() {
        if item.line.is_some() == item.range.is_some() {
            return Err(CliError::Validation(format!(
                "batch item #{idx}: exactly one of line/range is required"
            )));
        }
        comments.entry(item.file).or_default().push(CommentInput {
            line: item.line,
            range: item.range,
            message: item.message,
            unresolved: item.unresolved,
            ..Default::default()
        });
    }
    Ok(ReviewInput {
        comments: Some(comments),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_requires_exactly_one_location() {
        let ok = batch_input(
            r#"[{"file":"a.rs","line":3,"message":"x"},
                {"file":"a.rs","range":{"start_line":1,"end_line":2},"message":"y"}]"#,
        )
        .unwrap();
        assert_eq!(ok.comments.unwrap()["a.rs"].len(), 2);

        assert!(batch_input(r#"[{"file":"a.rs","message":"x"}]"#).is_err());
        assert!(batch_input(
            r#"[{"file":"a.rs","line":1,"range":{"start_line":1,"end_line":2},"message":"x"}]"#
        )
        .is_err());
        assert!(batch_input("[]").is_err());
        assert!(batch_input("{}").is_err());
    }
}
