//! `diff`: patch or file list of the current patchset.

use std::collections::BTreeMap;

use gerrit_api::types::FileInfo;
use serde_json::json;

use crate::commands::{Context, EXIT_OK};
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat, json, xml::XmlDoc};

pub async fn run(
    ctx: &Context,
    change: String,
    file: Option<String>,
    files_only: bool,
    diff_format: String,
) -> CliResult<i32> {
    let files_only = files_only || diff_format == "files";
    if !matches!(diff_format.as_str(), "unified" | "files") {
        return Err(CliError::Validation(format!(
            "unknown diff format `{diff_format}` (expected unified or files)"
        )));
    }

    let resolved = ctx.resolve_change(Some(&change))?;

    if files_only {
        let files = ctx.client.list_files(&resolved.id, "current").await?;
        let rendered = render_files(ctx.format, &files);
        output::write_stdout(&rendered).await?;
        return Ok(EXIT_OK);
    }

    let patch = ctx.client.get_patch(&resolved.id, "current").await?;
    let patch = match &file {
        Some(path) => filter_patch(&patch, path).ok_or_else(|| {
            CliError::Validation(format!("`{path}` is not part of this change"))
        })?,
        None => patch,
    };

    let rendered = match ctx.format {
        OutputFormat::Text => patch,
        OutputFormat::Json => json::success_with("diff", json!(patch)),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            doc.leaf_cdata("diff", &patch);
            doc.finish()
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}

/// Cut one file's section out of a unified patch.
fn filter_patch(patch: &str, path: &str) -> Option<String> {
    let mut out = String::new();
    let mut keep = false;
    for line in patch.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            keep = rest.contains(path);
        }
        if keep {
            out.push_str(line);
            out.push('\n');
        }
    }
    (!out.is_empty()).then_some(out)
}

fn render_files(format: OutputFormat, files: &BTreeMap<String, FileInfo>) -> String {
    // Gerrit lists the commit message as a pseudo-file; skip it.
    let entries: Vec<(&String, &FileInfo)> = files
        .iter()
        .filter(|(path, _)| path.as_str() != "/COMMIT_MSG")
        .collect();

    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for (path, info) in &entries {
                let status = info.status.as_deref().unwrap_or("M");
                let ins = info.lines_inserted.unwrap_or(0);
                let del = info.lines_deleted.unwrap_or(0);
                out.push_str(&format!("{status}  {path}  +{ins} -{del}\n"));
            }
            if out.is_empty() {
                out.push_str("no files changed\n");
            }
            out
        }
        OutputFormat::Json => {
            let map: BTreeMap<&String, &FileInfo> = entries.into_iter().collect();
            json::success_with("files", json!(map))
        }
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            doc.open("files");
            for (path, info) in &entries {
                doc.open_attrs(
                    "file",
                    &[("status", info.status.as_deref().unwrap_or("M"))],
                );
                doc.leaf("path", path);
                if let Some(n) = info.lines_inserted {
                    doc.leaf("insertions", &n.to_string());
                }
                if let Some(n) = info.lines_deleted {
                    doc.leaf("deletions", &n.to_string());
                }
                doc.close();
            }
            doc.close();
            doc.finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_filtering_extracts_one_file() {
        let patch = "diff --git a/x.rs b/x.rs\n--- a/x.rs\n+++ b/x.rs\n+line\n\
                     diff --git a/y.rs b/y.rs\n--- a/y.rs\n+++ b/y.rs\n-line\n";
        let only_y = filter_patch(patch, "y.rs").unwrap();
        assert!(only_y.contains("b/y.rs"));
        assert!(!only_y.contains("b/x.rs"));
        assert!(filter_patch(patch, "z.rs").is_none());
    }
}
