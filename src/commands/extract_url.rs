//! `extract-url`: pull HTTP(S) URLs out of a change's messages (and
//! optionally its comments), filtered by substring or regex.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;

use crate::commands::{Context, EXIT_OK};
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat, json, xml::XmlDoc};

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r#"https?://[^\s<>"')\]]+"#).unwrap();
    // Guards against catastrophic backtracking in user-supplied patterns:
    // quantified groups that themselves contain quantifiers, and stacked
    // quantifiers after a character class.
    static ref NESTED_QUANTIFIER_RE: Regex =
        Regex::new(r"\([^)]*[+*][^)]*\)[+*?]?").unwrap();
    static ref STACKED_QUANTIFIER_RE: Regex =
        Regex::new(r"\[[^\]]*\][+*]{2,}").unwrap();
}

const MAX_PATTERN_LEN: usize = 500;

/// Validate a user-supplied regex against the ReDoS guard, then compile it.
fn compile_user_regex(pattern: &str) -> CliResult<Regex> {
    if pattern.len() > MAX_PATTERN_LEN {
        return Err(CliError::Validation(format!(
            "regex rejected: longer than {MAX_PATTERN_LEN} characters"
        )));
    }
    if NESTED_QUANTIFIER_RE.is_match(pattern) {
        return Err(CliError::Validation(
            "regex rejected: nested quantifiers (e.g. `(a+)+`) are not allowed".to_string(),
        ));
    }
    if STACKED_QUANTIFIER_RE.is_match(pattern) {
        return Err(CliError::Validation(
            "regex rejected: stacked quantifiers after a character class are not allowed"
                .to_string(),
        ));
    }
    Regex::new(pattern)
        .map_err(|e| CliError::Validation(format!("invalid regex: {e}")))
}

/// A dated text fragment to scan; keeps chronological order.
struct Source {
    date: String,
    text: String,
}

pub async fn run(
    ctx: &Context,
    pattern: String,
    change: Option<String>,
    include_comments: bool,
    use_regex: bool,
) -> CliResult<i32> {
    // Validation happens before any network call.
    let matcher: Box<dyn Fn(&str) -> bool> = if use_regex {
        let re = compile_user_regex(&pattern)?;
        Box::new(move |url: &str| re.is_match(url))
    } else {
        let needle = pattern.to_lowercase();
        Box::new(move |url: &str| url.to_lowercase().contains(&needle))
    };

    let resolved = ctx.resolve_change(change.as_deref())?;

    let mut sources: Vec<Source> = Vec::new();
    if include_comments {
        let (messages, comments) = tokio::try_join!(
            ctx.client.get_messages(&resolved.id),
            ctx.client.get_comments(&resolved.id),
        )?;
        sources.extend(messages.into_iter().map(|m| Source {
            date: m.date,
            text: m.message,
        }));
        sources.extend(comments.into_values().flatten().map(|c| Source {
            date: c.updated.unwrap_or_default(),
            text: c.message,
        }));
    } else {
        let messages = ctx.client.get_messages(&resolved.id).await?;
        sources.extend(messages.into_iter().map(|m| Source {
            date: m.date,
            text: m.message,
        }));
    }
    // Oldest first across messages and comments.
    sources.sort_by(|a, b| a.date.cmp(&b.date));

    let mut urls: Vec<String> = Vec::new();
    for src in &sources {
        for m in URL_RE.find_iter(&src.text) {
            let url = m.as_str().trim_end_matches(['.', ',', ';']).to_string();
            if matcher(&url) && !urls.contains(&url) {
                urls.push(url);
            }
        }
    }

    let rendered = match ctx.format {
        OutputFormat::Text => {
            if urls.is_empty() {
                "no matching urls".to_string()
            } else {
                urls.join("\n")
            }
        }
        OutputFormat::Json => json::success_with("urls", json!(urls)),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            for url in &urls {
                doc.leaf("url", url);
            }
            doc.finish()
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redos_guard_rejects_known_bad_patterns() {
        assert!(compile_user_regex("(a+)+").is_err());
        assert!(compile_user_regex("(x*)?").is_err());
        assert!(compile_user_regex("[a-z]++").is_err());
        assert!(compile_user_regex(&"a".repeat(501)).is_err());
    }

    #[test]
    fn redos_guard_accepts_ordinary_patterns() {
        assert!(compile_user_regex("jenkins\\.example\\.com").is_ok());
        assert!(compile_user_regex("build/[0-9]+").is_ok());
    }

    #[test]
    fn url_regex_finds_and_trims() {
        let text = "see https://ci.example.com/build/42, and (https://other.io/x)";
        let urls: Vec<&str> = URL_RE.find_iter(text).map(|m| m.as_str()).collect();
        assert_eq!(urls[0], "https://ci.example.com/build/42,");
        assert_eq!(urls[1], "https://other.io/x");
    }
}
