//! Prompt assembly for the two review passes.
//!
//! Both prompts share the same layout: user preamble (or the default),
//! a system section, then structured change metadata. The inline pass asks
//! for machine-readable JSON inside `<response>` tags; the overall pass
//! asks for a narrative review.

use gerrit_api::types::{ChangeInfo, CommentInfo, MessageInfo};

use crate::response::COMMENT_MARKER;

/// Everything the prompts need to know about the change under review.
#[derive(Debug)]
pub struct ChangeContext<'a> {
    pub change: &'a ChangeInfo,
    /// Inline comments, oldest first.
    pub comments: &'a [CommentInfo],
    /// Review messages, oldest first, noise (autogenerated tags) filtered.
    pub messages: &'a [MessageInfo],
    /// Paths changed by the patchset under review.
    pub changed_files: &'a [String],
}

const DEFAULT_INLINE_PREAMBLE: &str = "You are a meticulous code reviewer. Find real problems: correctness bugs, \
races, error-handling gaps, security issues. Skip style nits unless they hide a bug.";

const DEFAULT_OVERALL_PREAMBLE: &str = "You are a senior engineer writing a short overall review of a change. \
Summarize what it does, then call out risks and anything that must be fixed before merge.";

/// Prompt for the inline pass: structured JSON output.
pub fn build_inline_prompt(
    user_prompt: Option<&str>,
    system_prompt: Option<&str>,
    ctx: &ChangeContext<'_>,
) -> String {
    let mut s = String::new();
    s.push_str(user_prompt.unwrap_or(DEFAULT_INLINE_PREAMBLE));
    s.push_str("\n\n# Output contract\n");
    s.push_str(
        "Respond with a JSON array wrapped in <response></response> tags. Each element:\n\
         {\"file\": \"<path from the changed-files list>\", \"line\": <int>, \"message\": \"<text>\"}\n\
         or {\"file\": ..., \"range\": {\"start_line\": <int>, \"end_line\": <int>}, \"message\": ...}.\n",
    );
    s.push_str(&format!(
        "Exactly one of line/range per comment. Begin every message with \"{COMMENT_MARKER}\". \
         An empty array is a valid answer.\n"
    ));
    if let Some(sys) = system_prompt {
        s.push_str("\n# Additional instructions\n");
        s.push_str(sys);
        s.push('\n');
    }
    push_change_metadata(&mut s, ctx);
    s.push_str(
        "\n# Working tree\nYou are inside a checkout of this patchset. You may run read-only \
         git commands (git log, git diff HEAD^, git show) and read any file to build context.\n",
    );
    s
}

/// Prompt for the overall pass: narrative text.
pub fn build_overall_prompt(
    user_prompt: Option<&str>,
    system_prompt: Option<&str>,
    ctx: &ChangeContext<'_>,
) -> String {
    let mut s = String::new();
    s.push_str(user_prompt.unwrap_or(DEFAULT_OVERALL_PREAMBLE));
    s.push_str("\n\n# Output contract\nRespond with plain prose, a few short paragraphs. No JSON.\n");
    if let Some(sys) = system_prompt {
        s.push_str("\n# Additional instructions\n");
        s.push_str(sys);
        s.push('\n');
    }
    push_change_metadata(&mut s, ctx);
    s.push_str(
        "\n# Working tree\nYou are inside a checkout of this patchset; use read-only git \
         commands to inspect it.\n",
    );
    s
}

fn push_change_metadata(s: &mut String, ctx: &ChangeContext<'_>) {
    let c = ctx.change;
    s.push_str("\n# Change\n");
    s.push_str(&format!("project: {}\n", c.project));
    s.push_str(&format!("branch: {}\n", c.branch));
    s.push_str(&format!("status: {}\n", c.status));
    s.push_str(&format!("subject: {}\n", c.subject));
    if let Some(owner) = &c.owner {
        s.push_str(&format!("author: {}\n", owner.display()));
    }

    if !ctx.changed_files.is_empty() {
        s.push_str("\n# Changed files\n");
        for f in ctx.changed_files {
            s.push_str(f);
            s.push('\n');
        }
    }

    if !ctx.comments.is_empty() {
        s.push_str("\n# Existing inline comments (oldest first)\n");
        for cm in ctx.comments {
            let path = cm.path.as_deref().unwrap_or("?");
            let author = cm
                .author
                .as_ref()
                .map(|a| a.display())
                .unwrap_or_else(|| "unknown".to_string());
            match (cm.line, &cm.range) {
                (Some(line), _) => {
                    s.push_str(&format!("{path}:{line} [{author}] {}\n", cm.message))
                }
                (None, Some(r)) => s.push_str(&format!(
                    "{path}:{}-{} [{author}] {}\n",
                    r.start_line, r.end_line, cm.message
                )),
                (None, None) => s.push_str(&format!("{path} [{author}] {}\n", cm.message)),
            }
        }
    }

    if !ctx.messages.is_empty() {
        s.push_str("\n# Review messages (oldest first)\n");
        for m in ctx.messages {
            let author = m
                .author
                .as_ref()
                .map(|a| a.display())
                .unwrap_or_else(|| "unknown".to_string());
            s.push_str(&format!("[{author}] {}\n", m.message.trim()));
        }
    }
}

/// Drop autogenerated noise (CI votes, merge bots) from the message stream
/// before it reaches the prompt.
pub fn filter_review_messages(messages: &[MessageInfo]) -> Vec<MessageInfo> {
    messages
        .iter()
        .filter(|m| {
            m.tag
                .as_deref()
                .map(|t| !t.starts_with("autogenerated:"))
                .unwrap_or(true)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gerrit_api::types::ChangeInfo;

    fn ctx_change() -> ChangeInfo {
        ChangeInfo {
            project: "demo/proj".to_string(),
            branch: "main".to_string(),
            status: "NEW".to_string(),
            subject: "Add widget".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn inline_prompt_contains_contract_and_metadata() {
        let change = ctx_change();
        let files = vec!["src/widget.rs".to_string()];
        let ctx = ChangeContext {
            change: &change,
            comments: &[],
            messages: &[],
            changed_files: &files,
        };
        let p = build_inline_prompt(None, None, &ctx);
        assert!(p.contains("<response>"));
        assert!(p.contains("project: demo/proj"));
        assert!(p.contains("src/widget.rs"));
        assert!(p.contains(COMMENT_MARKER.trim_end()));
    }

    #[test]
    fn user_prompt_replaces_default_preamble() {
        let change = ctx_change();
        let ctx = ChangeContext {
            change: &change,
            comments: &[],
            messages: &[],
            changed_files: &[],
        };
        let p = build_inline_prompt(Some("Focus on unsafe blocks."), None, &ctx);
        assert!(p.starts_with("Focus on unsafe blocks."));
        assert!(!p.contains("meticulous code reviewer"));
    }

    #[test]
    fn autogenerated_messages_are_filtered() {
        let mut ci = MessageInfo::default();
        ci.message = "Build Started".to_string();
        ci.tag = Some("autogenerated:ci".to_string());
        let mut human = MessageInfo::default();
        human.message = "Please fix the test".to_string();
        let kept = filter_review_messages(&[ci, human]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].message, "Please fix the test");
    }
}
