//! AI response extraction, validation and path repair.
//!
//! The tool's stdout may wrap the payload in `<response>` tags; extraction
//! is lenient and falls back to the whole output. Each draft is validated
//! against the posting contract (exactly one of line/range, marker prefix)
//! and its path is repaired against the changed-files list by normalized
//! suffix matching. Ambiguous or unmatchable drafts are dropped with a
//! warning rather than posted to the wrong place.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{Error, ReviewResult};

/// Every posted AI message starts with this marker.
pub const COMMENT_MARKER: &str = "🤖 ";

lazy_static! {
    static ref RESPONSE_RE: Regex =
        Regex::new(r"(?s)<response>(.*)</response>").unwrap();
}

/// Inline range of a draft, mirroring Gerrit's comment range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRange {
    pub start_line: u32,
    pub end_line: u32,
}

/// A validated, path-repaired inline comment ready for posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineDraft {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<DraftRange>,
    pub message: String,
}

/// Extract the payload between the outermost `<response>` tags; absent tags
/// mean the whole stdout is the payload.
pub fn extract_response_payload(stdout: &str) -> &str {
    match RESPONSE_RE.captures(stdout) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(stdout),
        None => stdout,
    }
    .trim()
}

/// Parse the payload as a JSON array of draft objects.
pub fn parse_draft_array(payload: &str) -> ReviewResult<Vec<serde_json::Value>> {
    let value: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| Error::InvalidResponse(e.to_string()))?;
    match value {
        serde_json::Value::Array(items) => Ok(items),
        other => Err(Error::InvalidResponse(format!(
            "expected an array, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Outcome of matching an AI-reported path against the changed files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    /// Present verbatim in the list.
    Exact,
    /// Unique suffix match; carries the corrected canonical path.
    Repaired(String),
    Ambiguous(usize),
    NoMatch,
}

/// Match `file` against the changed-files list, exactly or as a normalized
/// path suffix (`\` treated as `/`, match must sit on a `/` boundary).
pub fn match_path(file: &str, changed: &[String]) -> PathMatch {
    let wanted = file.replace('\\', "/");
    let wanted = wanted.trim_start_matches("./");
    if changed.iter().any(|c| c == wanted) {
        return PathMatch::Exact;
    }
    let suffix = format!("/{wanted}");
    let hits: Vec<&String> = changed.iter().filter(|c| c.ends_with(&suffix)).collect();
    match hits.len() {
        0 => PathMatch::NoMatch,
        1 => PathMatch::Repaired(hits[0].clone()),
        n => PathMatch::Ambiguous(n),
    }
}

/// Validate raw draft objects and repair their paths.
///
/// Returns the surviving drafts plus human-readable warnings for everything
/// that was dropped or corrected.
pub fn validate_and_repair(
    items: Vec<serde_json::Value>,
    changed_files: &[String],
) -> (Vec<InlineDraft>, Vec<String>) {
    let mut drafts = Vec::new();
    let mut warnings = Vec::new();

    for (idx, item) in items.into_iter().enumerate() {
        let Some(obj) = item.as_object() else {
            warnings.push(format!("draft #{idx}: not an object, dropped"));
            continue;
        };
        let Some(file) = obj.get("file").and_then(|v| v.as_str()) else {
            warnings.push(format!("draft #{idx}: missing file, dropped"));
            continue;
        };
        let Some(message) = obj.get("message").and_then(|v| v.as_str()) else {
            warnings.push(format!("draft #{idx}: missing message, dropped"));
            continue;
        };

        let line = obj.get("line").and_then(|v| v.as_u64()).map(|v| v as u32);
        let range = obj
            .get("range")
            .and_then(|v| serde_json::from_value::<DraftRange>(v.clone()).ok());

        // Posting contract: exactly one of line/range.
        match (line.is_some(), range.is_some()) {
            (false, false) => {
                warnings.push(format!(
                    "draft #{idx} ({file}): neither line nor range, dropped"
                ));
                continue;
            }
            (true, true) => {
                warnings.push(format!(
                    "draft #{idx} ({file}): both line and range, dropped"
                ));
                continue;
            }
            _ => {}
        }

        let file = match match_path(file, changed_files) {
            PathMatch::Exact => file.to_string(),
            PathMatch::Repaired(canonical) => {
                debug!("ai: repaired path {file} -> {canonical}");
                warnings.push(format!("draft #{idx}: path repaired to {canonical}"));
                canonical
            }
            PathMatch::Ambiguous(n) => {
                warn!("ai: path {file} matches {n} changed files, dropping draft");
                warnings.push(format!(
                    "draft #{idx} ({file}): ambiguous path ({n} candidates), dropped"
                ));
                continue;
            }
            PathMatch::NoMatch => {
                warn!("ai: path {file} not among changed files, dropping draft");
                warnings.push(format!(
                    "draft #{idx} ({file}): not a changed file, dropped"
                ));
                continue;
            }
        };

        let message = if message.starts_with(COMMENT_MARKER) {
            message.to_string()
        } else {
            format!("{COMMENT_MARKER}{message}")
        };

        drafts.push(InlineDraft {
            file,
            line,
            range,
            message,
        });
    }

    (drafts, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_extraction_is_lenient() {
        assert_eq!(
            extract_response_payload("noise <response>[1]</response> trailer"),
            "[1]"
        );
        assert_eq!(extract_response_payload("  [1, 2] \n"), "[1, 2]");
        // Outermost tags win when nested.
        assert_eq!(
            extract_response_payload("<response>a<response>b</response>c</response>"),
            "a<response>b</response>c"
        );
    }

    #[test]
    fn parse_rejects_non_arrays() {
        assert!(parse_draft_array("{\"a\":1}").is_err());
        assert!(parse_draft_array("not json").is_err());
        assert_eq!(parse_draft_array("[]").unwrap().len(), 0);
    }

    fn changed() -> Vec<String> {
        vec![
            "src/lib.rs".to_string(),
            "crates/core/src/util.rs".to_string(),
            "crates/extra/src/util.rs".to_string(),
        ]
    }

    #[test]
    fn path_matching() {
        assert_eq!(match_path("src/lib.rs", &changed()), PathMatch::Exact);
        assert_eq!(
            match_path("core/src/util.rs", &changed()),
            PathMatch::Repaired("crates/core/src/util.rs".to_string())
        );
        assert_eq!(match_path("util.rs", &changed()), PathMatch::Ambiguous(2));
        assert_eq!(match_path("other.rs", &changed()), PathMatch::NoMatch);
        // Backslashes normalize; boundary is required (no mid-segment match).
        assert_eq!(
            match_path("core\\src\\util.rs", &changed()),
            PathMatch::Repaired("crates/core/src/util.rs".to_string())
        );
        assert_eq!(match_path("ib.rs", &changed()), PathMatch::NoMatch);
    }

    #[test]
    fn validation_enforces_exactly_one_location() {
        let items = vec![
            serde_json::json!({"file": "src/lib.rs", "line": 3, "message": "🤖 one"}),
            serde_json::json!({"file": "src/lib.rs", "message": "no location"}),
            serde_json::json!({"file": "src/lib.rs", "line": 3,
                               "range": {"start_line": 1, "end_line": 2}, "message": "both"}),
            serde_json::json!({"file": "src/lib.rs",
                               "range": {"start_line": 4, "end_line": 6}, "message": "range"}),
        ];
        let (drafts, warnings) = validate_and_repair(items, &changed());
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].line, Some(3));
        assert_eq!(
            drafts[1].range,
            Some(DraftRange {
                start_line: 4,
                end_line: 6
            })
        );
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn marker_is_enforced() {
        let items = vec![serde_json::json!({
            "file": "src/lib.rs", "line": 1, "message": "missing marker"
        })];
        let (drafts, _) = validate_and_repair(items, &changed());
        assert!(drafts[0].message.starts_with(COMMENT_MARKER));
    }

    #[test]
    fn unknown_fields_pass_through_validation() {
        let items = vec![serde_json::json!({
            "file": "src/lib.rs", "line": 1, "message": "🤖 ok",
            "severity": "high", "confidence": 0.9
        })];
        let (drafts, warnings) = validate_and_repair(items, &changed());
        assert_eq!(drafts.len(), 1);
        assert!(warnings.is_empty());
    }
}
