//! Gerrit REST client.
//!
//! Endpoints used (Gerrit REST API, authenticated `/a/` prefix):
//! - GET    /changes/?q=<query>&o=...
//! - GET    /changes/<id>?o=...
//! - GET    /changes/<id>/revisions/<rev>/files | /patch
//! - GET    /changes/<id>/comments | /messages
//! - POST   /changes/<id>/reviewers | /revisions/<rev>/review | /submit
//!          | /abandon | /restore | /rebase
//! - PUT/GET/DELETE /changes/<id>/topic
//! - GET    /projects/ | /groups/ | /groups/<id>/detail | /groups/<id>/members/
//! - GET    /accounts/self (auth probe)
//!
//! Every response body is plain text prefixed with Gerrit's anti-XSSI magic
//! line `)]}'`; it is stripped before JSON decoding. Decoding failures carry
//! the endpoint so schema drift is diagnosable.

use std::collections::BTreeMap;
use std::time::Duration;

use base64::Engine as _;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{ApiResult, Error};
use crate::ident::normalize_host;
use crate::types::*;

/// Anti-XSSI prefix Gerrit prepends to every JSON response.
const XSSI_MAGIC: &str = ")]}'";

/// Query options attached to all change listings.
const LIST_OPTIONS: &[&str] = &["LABELS", "DETAILED_LABELS", "DETAILED_ACCOUNTS"];

/// Authenticated Gerrit REST client. Cheap to clone; stateless per request.
#[derive(Debug, Clone)]
pub struct GerritClient {
    http: reqwest::Client,
    base: String,
    username: String,
    password: String,
}

impl GerritClient {
    /// Build a client for `host` (normalized) with HTTP Basic credentials.
    pub fn new(host: &str, username: &str, password: &str) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent("gerrit-cli/0.1")
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self {
            http,
            base: normalize_host(host),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Host this client talks to (normalized, scheme included).
    pub fn host(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/a{}", self.base, path)
    }

    /// Strip the anti-XSSI magic line if present.
    fn strip_xssi(body: &str) -> &str {
        match body.strip_prefix(XSSI_MAGIC) {
            Some(rest) => rest.trim_start_matches(['\r', '\n']),
            None => body,
        }
    }

    async fn request_text(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<(u16, String)> {
        let url = self.url(endpoint);
        debug!("rest: {} {}", method, endpoint);
        let mut req = self
            .http
            .request(method, &url)
            .basic_auth(&self.username, Some(&self.password));
        if let Some(json) = body {
            req = req.json(&json);
        }
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        Ok((status, text))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<T> {
        let (status, text) = self.request_text(method, endpoint, body).await?;
        if !(200..300).contains(&status) {
            return Err(Error::api(status, endpoint, &text));
        }
        let payload = Self::strip_xssi(&text);
        serde_json::from_str(payload).map_err(|e| Error::parse(endpoint, e))
    }

    async fn fetch_no_content(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<()> {
        let (status, text) = self.request_text(method, endpoint, body).await?;
        if !(200..300).contains(&status) {
            return Err(Error::api(status, endpoint, &text));
        }
        Ok(())
    }

    fn body_of<T: serde::Serialize>(input: &T) -> ApiResult<serde_json::Value> {
        serde_json::to_value(input).map_err(|e| Error::Validation(e.to_string()))
    }

    // ===== Changes =====

    /// Search changes with the standard listing options.
    pub async fn list_changes(&self, query: &str) -> ApiResult<Vec<ChangeInfo>> {
        self.list_changes_with_options(query, LIST_OPTIONS).await
    }

    /// Search changes with explicit `o=` options.
    pub async fn list_changes_with_options(
        &self,
        query: &str,
        options: &[&str],
    ) -> ApiResult<Vec<ChangeInfo>> {
        let mut endpoint = format!("/changes/?q={}", urlencoding::encode(query));
        for o in options {
            endpoint.push_str("&o=");
            endpoint.push_str(o);
        }
        self.fetch(reqwest::Method::GET, &endpoint, None).await
    }

    /// Fetch one change; `options` are `o=` values (CURRENT_REVISION, ...).
    pub async fn get_change(&self, id: &str, options: &[&str]) -> ApiResult<ChangeInfo> {
        let mut endpoint = format!("/changes/{}", urlencoding::encode(id));
        let mut sep = '?';
        for o in options {
            endpoint.push(sep);
            sep = '&';
            endpoint.push_str("o=");
            endpoint.push_str(o);
        }
        self.fetch(reqwest::Method::GET, &endpoint, None).await
    }

    /// Fetch a change with its message stream (`o=MESSAGES`).
    pub async fn get_change_with_messages(&self, id: &str) -> ApiResult<ChangeInfo> {
        self.get_change(id, &["MESSAGES"]).await
    }

    /// Resolve a revision. `None` means the current patchset.
    ///
    /// Gerrit exposes revisions inside ChangeInfo, so this is a change fetch
    /// with the right option plus a selection step.
    pub async fn get_revision(
        &self,
        id: &str,
        patchset: Option<u32>,
    ) -> ApiResult<RevisionInfo> {
        let endpoint_label = format!("/changes/{id} (revisions)");
        match patchset {
            None => {
                let change = self.get_change(id, &["CURRENT_REVISION"]).await?;
                change
                    .current_revision_info()
                    .cloned()
                    .ok_or_else(|| Error::parse(&endpoint_label, "missing current revision"))
            }
            Some(ps) => {
                let change = self.get_change(id, &["ALL_REVISIONS"]).await?;
                change.revision_by_number(ps).cloned().ok_or_else(|| {
                    Error::Validation(format!("change {id} has no patchset {ps}"))
                })
            }
        }
    }

    /// File list of a revision (path → summary). `rev` is a sha, a patchset
    /// number, or `current`.
    pub async fn list_files(&self, id: &str, rev: &str) -> ApiResult<BTreeMap<String, FileInfo>> {
        let endpoint = format!(
            "/changes/{}/revisions/{}/files",
            urlencoding::encode(id),
            urlencoding::encode(rev)
        );
        self.fetch(reqwest::Method::GET, &endpoint, None).await
    }

    /// Unified diff of a revision. Gerrit serves it base64-encoded.
    pub async fn get_patch(&self, id: &str, rev: &str) -> ApiResult<String> {
        let endpoint = format!(
            "/changes/{}/revisions/{}/patch",
            urlencoding::encode(id),
            urlencoding::encode(rev)
        );
        let (status, text) = self
            .request_text(reqwest::Method::GET, &endpoint, None)
            .await?;
        if !(200..300).contains(&status) {
            return Err(Error::api(status, &endpoint, &text));
        }
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| Error::parse(&endpoint, format!("invalid base64 patch: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| Error::parse(&endpoint, format!("patch is not utf-8: {e}")))
    }

    /// All inline comments of a change, keyed by path, sorted by `updated`.
    pub async fn get_comments(
        &self,
        id: &str,
    ) -> ApiResult<BTreeMap<String, Vec<CommentInfo>>> {
        let endpoint = format!("/changes/{}/comments", urlencoding::encode(id));
        let mut map: BTreeMap<String, Vec<CommentInfo>> =
            self.fetch(reqwest::Method::GET, &endpoint, None).await?;
        for (path, comments) in map.iter_mut() {
            for c in comments.iter_mut() {
                c.path = Some(path.clone());
            }
            comments.sort_by(|a, b| a.updated.cmp(&b.updated));
        }
        Ok(map)
    }

    /// Message stream of a change, in server order.
    pub async fn get_messages(&self, id: &str) -> ApiResult<Vec<MessageInfo>> {
        let endpoint = format!("/changes/{}/messages", urlencoding::encode(id));
        self.fetch(reqwest::Method::GET, &endpoint, None).await
    }

    // ===== Reviewers =====

    pub async fn add_reviewer(
        &self,
        id: &str,
        input: &ReviewerInput,
    ) -> ApiResult<AddReviewerResult> {
        let endpoint = format!("/changes/{}/reviewers", urlencoding::encode(id));
        self.fetch(reqwest::Method::POST, &endpoint, Some(Self::body_of(input)?))
            .await
    }

    pub async fn remove_reviewer(
        &self,
        id: &str,
        reviewer: &str,
        notify: Option<&str>,
    ) -> ApiResult<()> {
        let mut endpoint = format!(
            "/changes/{}/reviewers/{}",
            urlencoding::encode(id),
            urlencoding::encode(reviewer)
        );
        if let Some(n) = notify {
            endpoint.push_str("?notify=");
            endpoint.push_str(n);
        }
        self.fetch_no_content(reqwest::Method::DELETE, &endpoint, None)
            .await
    }

    // ===== Review / lifecycle =====

    /// Post votes, a message and/or batched inline comments on a revision.
    pub async fn post_review(
        &self,
        id: &str,
        rev: &str,
        input: &ReviewInput,
    ) -> ApiResult<ReviewResult> {
        let endpoint = format!(
            "/changes/{}/revisions/{}/review",
            urlencoding::encode(id),
            urlencoding::encode(rev)
        );
        self.fetch(reqwest::Method::POST, &endpoint, Some(Self::body_of(input)?))
            .await
    }

    pub async fn submit_change(&self, id: &str) -> ApiResult<ChangeInfo> {
        let endpoint = format!("/changes/{}/submit", urlencoding::encode(id));
        self.fetch(reqwest::Method::POST, &endpoint, None).await
    }

    pub async fn abandon_change(
        &self,
        id: &str,
        message: Option<&str>,
    ) -> ApiResult<ChangeInfo> {
        let endpoint = format!("/changes/{}/abandon", urlencoding::encode(id));
        let body = message.map(|m| serde_json::json!({ "message": m }));
        self.fetch(reqwest::Method::POST, &endpoint, body).await
    }

    pub async fn restore_change(
        &self,
        id: &str,
        message: Option<&str>,
    ) -> ApiResult<ChangeInfo> {
        let endpoint = format!("/changes/{}/restore", urlencoding::encode(id));
        let body = message.map(|m| serde_json::json!({ "message": m }));
        self.fetch(reqwest::Method::POST, &endpoint, body).await
    }

    pub async fn rebase_change(&self, id: &str, base: Option<&str>) -> ApiResult<ChangeInfo> {
        let endpoint = format!("/changes/{}/rebase", urlencoding::encode(id));
        let body = base.map(|b| serde_json::json!({ "base": b }));
        self.fetch(reqwest::Method::POST, &endpoint, body).await
    }

    // ===== Topic =====

    pub async fn get_topic(&self, id: &str) -> ApiResult<String> {
        let endpoint = format!("/changes/{}/topic", urlencoding::encode(id));
        let (status, text) = self
            .request_text(reqwest::Method::GET, &endpoint, None)
            .await?;
        if !(200..300).contains(&status) {
            return Err(Error::api(status, &endpoint, &text));
        }
        let payload = Self::strip_xssi(&text);
        // Gerrit answers with an empty body when no topic is set.
        if payload.trim().is_empty() {
            return Ok(String::new());
        }
        serde_json::from_str(payload).map_err(|e| Error::parse(&endpoint, e))
    }

    pub async fn set_topic(&self, id: &str, topic: &str) -> ApiResult<String> {
        let endpoint = format!("/changes/{}/topic", urlencoding::encode(id));
        self.fetch(
            reqwest::Method::PUT,
            &endpoint,
            Some(serde_json::json!({ "topic": topic })),
        )
        .await
    }

    pub async fn delete_topic(&self, id: &str) -> ApiResult<()> {
        let endpoint = format!("/changes/{}/topic", urlencoding::encode(id));
        self.fetch_no_content(reqwest::Method::DELETE, &endpoint, None)
            .await
    }

    // ===== Projects / groups =====

    pub async fn list_projects(
        &self,
        pattern: Option<&str>,
    ) -> ApiResult<BTreeMap<String, ProjectInfo>> {
        let mut endpoint = "/projects/?d".to_string();
        if let Some(p) = pattern {
            endpoint.push_str("&m=");
            endpoint.push_str(&urlencoding::encode(p));
        }
        self.fetch(reqwest::Method::GET, &endpoint, None).await
    }

    pub async fn list_groups(&self, q: &GroupQuery) -> ApiResult<BTreeMap<String, GroupInfo>> {
        let mut endpoint = "/groups/".to_string();
        let mut sep = '?';
        let mut push = |endpoint: &mut String, part: String| {
            endpoint.push(sep);
            sep = '&';
            endpoint.push_str(&part);
        };
        if let Some(p) = &q.pattern {
            push(&mut endpoint, format!("m={}", urlencoding::encode(p)));
        }
        if q.owned {
            push(&mut endpoint, "owned".to_string());
        }
        if let Some(p) = &q.project {
            push(&mut endpoint, format!("p={}", urlencoding::encode(p)));
        }
        if let Some(u) = &q.user {
            push(&mut endpoint, format!("user={}", urlencoding::encode(u)));
        }
        if let Some(n) = q.limit {
            push(&mut endpoint, format!("n={n}"));
        }
        self.fetch(reqwest::Method::GET, &endpoint, None).await
    }

    pub async fn get_group_detail(&self, id: &str) -> ApiResult<GroupInfo> {
        let endpoint = format!("/groups/{}/detail", urlencoding::encode(id));
        self.fetch(reqwest::Method::GET, &endpoint, None).await
    }

    pub async fn get_group_members(&self, id: &str) -> ApiResult<Vec<AccountInfo>> {
        let endpoint = format!("/groups/{}/members/", urlencoding::encode(id));
        self.fetch(reqwest::Method::GET, &endpoint, None).await
    }

    // ===== Accounts / misc =====

    /// Auth probe. 401/403 here (and only here) map to `Error::Auth`.
    pub async fn get_self_account(&self) -> ApiResult<AccountInfo> {
        let endpoint = "/accounts/self";
        match self.fetch(reqwest::Method::GET, endpoint, None).await {
            Err(Error::Api { status: 401 | 403, .. }) => Err(Error::Auth),
            other => other,
        }
    }

    /// Download the commit-msg hook script. Served outside `/a/`.
    pub async fn fetch_commit_msg_hook(&self) -> ApiResult<String> {
        let endpoint = "/tools/hooks/commit-msg";
        let url = format!("{}{}", self.base, endpoint);
        debug!("rest: GET {}", endpoint);
        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        if !(200..300).contains(&status) {
            return Err(Error::api(status, endpoint, &text));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xssi_stripping() {
        assert_eq!(GerritClient::strip_xssi(")]}'\n[]"), "[]");
        assert_eq!(GerritClient::strip_xssi(")]}'\r\n{}"), "{}");
        assert_eq!(GerritClient::strip_xssi("{\"a\":1}"), "{\"a\":1}");
    }
}
