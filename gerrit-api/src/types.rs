//! Typed Gerrit REST schema: response entities and request inputs.
//!
//! These are the "normalized output" of the adapter and are consumed by every
//! command. Only the fields the client actually uses are declared; unknown
//! fields in server responses are tolerated for forward compatibility.
//! Request inputs omit absent optionals (`skip_serializing_if`) so the wire
//! shape stays minimal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A Gerrit account, as embedded in changes, messages and comments.
///
/// Gerrit's `_`-prefixed wire names are deserialize-only; our own JSON
/// output uses the plain snake_case names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(
        rename(deserialize = "_account_id"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub account_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl AccountInfo {
    /// Best human-readable label: name, else username, else email, else id.
    pub fn display(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.username.clone())
            .or_else(|| self.email.clone())
            .or_else(|| self.account_id.map(|id| id.to_string()))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Reviewer buckets as returned with `DETAILED_LABELS`/reviewer options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewerMap {
    #[serde(rename = "REVIEWER", default, skip_serializing_if = "Vec::is_empty")]
    pub reviewers: Vec<AccountInfo>,
    #[serde(rename = "CC", default, skip_serializing_if = "Vec::is_empty")]
    pub ccs: Vec<AccountInfo>,
}

/// A single vote inside a label's `all` list (DETAILED_LABELS).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovalInfo {
    #[serde(
        rename(deserialize = "_account_id"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub account_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
}

/// Label state on a change (`o=LABELS` / `o=DETAILED_LABELS`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<AccountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected: Option<AccountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<Vec<ApprovalInfo>>,
}

/// Commit message/subject for a revision (`o=CURRENT_COMMIT`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A single patchset of a change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevisionInfo {
    #[serde(rename(deserialize = "_number"), default)]
    pub number: u32,
    /// Gerrit change ref, `refs/changes/NN/NNNN/N`. Validated before any
    /// git invocation, never trusted as-is.
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<AccountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitInfo>,
}

/// A change as returned by `/changes/`.
///
/// Server-owned; the client treats it as immutable within one command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeInfo {
    pub id: String,
    pub change_id: String,
    #[serde(rename(deserialize = "_number"))]
    pub number: u32,
    pub subject: String,
    /// NEW, MERGED or ABANDONED.
    pub status: String,
    pub project: String,
    pub branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<AccountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewers: Option<ReviewerMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, LabelInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submittable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_in_progress: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revisions: Option<BTreeMap<String, RevisionInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insertions: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletions: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<MessageInfo>>,
}

impl ChangeInfo {
    /// The revision entry for `current_revision`, when both are present.
    pub fn current_revision_info(&self) -> Option<&RevisionInfo> {
        let sha = self.current_revision.as_deref()?;
        self.revisions.as_ref()?.get(sha)
    }

    /// Find a revision by patchset number.
    pub fn revision_by_number(&self, patchset: u32) -> Option<&RevisionInfo> {
        self.revisions
            .as_ref()?
            .values()
            .find(|r| r.number == patchset)
    }
}

/// One entry of a change's message stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    /// ISO-8601; lexicographic order equals chronological order.
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AccountInfo>,
    #[serde(
        rename(deserialize = "_revision_number"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub revision_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Line range of an inline comment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentRange {
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_character: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_character: Option<u32>,
}

/// An inline comment as returned by `/changes/<id>/comments`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Absent in the comments map (the key is the path); filled in by the
    /// client when flattening.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<CommentRange>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AccountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<String>,
    /// REVISION (default) or PARENT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
}

/// Per-file diff summary from `/revisions/<rev>/files`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileInfo {
    /// A (added), D (deleted), R (renamed), C (copied), W (rewritten);
    /// absent means modified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_inserted: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_deleted: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
}

/// Project entry from `/projects/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Group entry from `/groups/` and `/groups/<id>/detail`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "group_id", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<AccountInfo>>,
}

// ===== Request inputs =====

/// Inline comment draft for `post_review`. Valid iff exactly one of `line`
/// and `range` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<CommentRange>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
}

/// Body of `POST /changes/<id>/revisions/<rev>/review`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<BTreeMap<String, Vec<CommentInput>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Result of posting a review (subset).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewResult {
    #[serde(default)]
    pub labels: Option<BTreeMap<String, i32>>,
}

/// Body of `POST /changes/<id>/reviewers`.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewerInput {
    pub reviewer: String,
    /// REVIEWER or CC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<String>,
}

/// Result of adding a reviewer; `error` is set when the server refused.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddReviewerResult {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub reviewers: Option<Vec<AccountInfo>>,
    #[serde(default)]
    pub ccs: Option<Vec<AccountInfo>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub confirm: Option<bool>,
}

/// Options for `/groups/` listing.
#[derive(Debug, Clone, Default)]
pub struct GroupQuery {
    pub pattern: Option<String>,
    pub owned: bool,
    pub project: Option<String>,
    pub user: Option<String>,
    pub limit: Option<u32>,
}
