//! Integration tests for the REST adapter against a mock Gerrit server.
//!
//! Exercises the anti-XSSI framing, the `/a/` prefix, Basic auth, query
//! encoding, typed decoding and the error taxonomy.

use gerrit_api::types::{GroupQuery, ReviewInput};
use gerrit_api::{Error, GerritClient};
use wiremock::matchers::{basic_auth, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const XSSI: &str = ")]}'\n";

fn change_json(number: u32, project: &str, updated: &str) -> String {
    format!(
        r#"{{"id":"{project}~main~Iaaaa","change_id":"Iaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "_number":{number},"subject":"subject {number}","status":"NEW",
            "project":"{project}","branch":"main","updated":"{updated}"}}"#
    )
}

async fn client_for(server: &MockServer) -> GerritClient {
    GerritClient::new(&server.uri(), "alice", "secret").unwrap()
}

#[tokio::test]
async fn list_changes_strips_xssi_and_authenticates() {
    let server = MockServer::start().await;
    let body = format!(
        "{XSSI}[{},{}]",
        change_json(1, "p-b", "2026-01-02 10:00:00"),
        change_json(2, "p-a", "2026-01-01 10:00:00")
    );
    Mock::given(method("GET"))
        .and(path("/a/changes/"))
        .and(basic_auth("alice", "secret"))
        .and(query_param("q", "is:open limit:25"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let changes = client.list_changes("is:open limit:25").await.unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].number, 1);
    assert_eq!(changes[1].project, "p-a");
}

#[tokio::test]
async fn get_change_maps_404_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a/changes/999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found: 999"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.get_change("999", &[]).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn schema_mismatch_is_a_parse_error_with_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a/changes/7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!("{XSSI}{{\"nonsense\":true}}")),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    match client.get_change("7", &[]).await.unwrap_err() {
        Error::Parse { endpoint, .. } => assert!(endpoint.contains("/changes/7")),
        other => panic!("expected Parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn auth_probe_maps_401_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a/accounts/self"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(matches!(
        client.get_self_account().await.unwrap_err(),
        Error::Auth
    ));
}

#[tokio::test]
async fn post_review_sends_labels_and_comments() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/a/changes/42/revisions/current/review"))
        .and(body_partial_json(serde_json::json!({
            "labels": { "Code-Review": 2 },
            "message": "lgtm"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("{XSSI}{{\"labels\":{{\"Code-Review\":2}}}}")),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let mut labels = std::collections::BTreeMap::new();
    labels.insert("Code-Review".to_string(), 2);
    let input = ReviewInput {
        message: Some("lgtm".to_string()),
        labels: Some(labels),
        ..Default::default()
    };
    let result = client.post_review("42", "current", &input).await.unwrap();
    assert_eq!(result.labels.unwrap().get("Code-Review"), Some(&2));
}

#[tokio::test]
async fn comments_are_flattened_with_paths_and_sorted() {
    let server = MockServer::start().await;
    let body = format!(
        r#"{XSSI}{{"src/lib.rs":[
            {{"id":"c2","line":9,"message":"later","updated":"2026-01-02 10:00:00"}},
            {{"id":"c1","line":3,"message":"earlier","updated":"2026-01-01 10:00:00"}}
        ]}}"#
    );
    Mock::given(method("GET"))
        .and(path("/a/changes/42/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let map = client.get_comments("42").await.unwrap();
    let comments = &map["src/lib.rs"];
    assert_eq!(comments[0].id.as_deref(), Some("c1"));
    assert_eq!(comments[0].path.as_deref(), Some("src/lib.rs"));
    assert_eq!(comments[1].id.as_deref(), Some("c2"));
}

#[tokio::test]
async fn group_listing_builds_query_options() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a/groups/"))
        .and(query_param("m", "dev"))
        .and(query_param("n", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "{XSSI}{{\"devs\":{{\"id\":\"abcd\",\"group_id\":12}}}}"
        )))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let q = GroupQuery {
        pattern: Some("dev".to_string()),
        limit: Some(5),
        ..Default::default()
    };
    let groups = client.list_groups(&q).await.unwrap();
    assert_eq!(groups["devs"].group_id, Some(12));
}
