//! `vote`: label votes with an optional message.

use std::collections::BTreeMap;

use gerrit_api::types::ReviewInput;
use serde_json::json;

use crate::commands::{Context, EXIT_OK};
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat, json, xml::XmlDoc};

pub async fn run(
    ctx: &Context,
    change: String,
    code_review: Option<i32>,
    verified: Option<i32>,
    label_pairs: Vec<String>,
    message: Option<String>,
) -> CliResult<i32> {
    let labels = collect_labels(code_review, verified, &label_pairs)?;
    if labels.is_empty() {
        return Err(CliError::Validation(
            "at least one label is required (--code-review, --verified or --label)".to_string(),
        ));
    }

    let resolved = ctx.resolve_change(Some(&change))?;
    let input = ReviewInput {
        message,
        labels: Some(labels.clone()),
        ..Default::default()
    };
    ctx.client.post_review(&resolved.id, "current", &input).await?;

    let rendered = match ctx.format {
        OutputFormat::Text => {
            let mut out = String::new();
            for (name, value) in &labels {
                out.push_str(&format!("voted {name} {value:+}\n"));
            }
            out
        }
        OutputFormat::Json => json::success_with("labels", json!(labels)),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            for (name, value) in &labels {
                doc.open_attrs(
                    "label",
                    &[("name", name.as_str()), ("value", value.to_string().as_str())],
                );
                doc.close();
            }
            doc.finish()
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}

/// Merge the shorthand flags and repeated `--label NAME VALUE` pairs.
fn collect_labels(
    code_review: Option<i32>,
    verified: Option<i32>,
    pairs: &[String],
) -> CliResult<BTreeMap<String, i32>> {
    let mut labels = BTreeMap::new();
    if let Some(v) = code_review {
        labels.insert("Code-Review".to_string(), v);
    }
    if let Some(v) = verified {
        labels.insert("Verified".to_string(), v);
    }
    if pairs.len() % 2 != 0 {
        return Err(CliError::Validation(
            "--label expects NAME VALUE pairs".to_string(),
        ));
    }
    for pair in pairs.chunks(2) {
        let name = pair[0].trim();
        if name.is_empty() {
            return Err(CliError::Validation("label name must not be empty".to_string()));
        }
        let value: i32 = pair[1].trim().parse().map_err(|_| {
            CliError::Validation(format!(
                "label value `{}` for {name} is not an integer",
                pair[1]
            ))
        })?;
        labels.insert(name.to_string(), value);
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_merge_from_flags_and_pairs() {
        let pairs = vec!["Custom".to_string(), "-1".to_string()];
        let labels = collect_labels(Some(2), Some(1), &pairs).unwrap();
        assert_eq!(labels["Code-Review"], 2);
        assert_eq!(labels["Verified"], 1);
        assert_eq!(labels["Custom"], -1);
    }

    #[test]
    fn bad_pairs_are_rejected() {
        assert!(collect_labels(None, None, &["Only".to_string()]).is_err());
        assert!(
            collect_labels(None, None, &["X".to_string(), "high".to_string()]).is_err()
        );
        assert!(
            collect_labels(None, None, &["".to_string(), "1".to_string()]).is_err()
        );
    }
}
