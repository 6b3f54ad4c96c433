//! End-to-end conformance tests for the comments HTTP API.
//!
//! Each test spawns an ephemeral in-process server (real TCP, real HTTP) via
//! [`comments_conformance::spawn_server`] and drives it with a `reqwest`
//! client.
//!
//! # Coverage
//!
//! | Test | Area |
//! |------|------|
//! | `health_returns_alive` | liveness |
//! | `post_then_get_round_trips` | create + read |
//! | `post_ignores_supplied_id` | create |
//! | `seeded_comments_are_listed` | list |
//! | `list_filters_by_slug` | list `?slug=` |
//! | `get_unknown_id_returns_404_envelope` | read errors |
//! | `get_non_numeric_id_returns_400` | id parsing |
//! | `post_malformed_body_returns_400` | body decoding |
//! | `put_merges_non_empty_fields` | update |
//! | `put_unknown_id_returns_404` | update errors |
//! | `delete_then_get_and_repeat_delete_return_404` | delete |
//! | `write_routes_without_token_return_401` | bearer auth |
//! | `token_signed_with_other_secret_returns_401` | bearer auth |
//! | `malformed_token_returns_401` | bearer auth |
//! | `basic_auth_accepts_configured_pair` | basic auth |
//! | `basic_auth_rejects_wrong_password` | basic auth |
//! | `unknown_route_returns_404` | routing |

use std::time::Duration;

use comments_api::CommentDraft;
use comments_conformance::{
    spawn_basic_server, spawn_bearer_server, TEST_PASSWORD, TEST_SECRET, TEST_USER,
};
use comments_server::{issue_token, CommentStore};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

fn token() -> String {
    issue_token(TEST_SECRET.as_bytes(), "conformance", Duration::from_secs(300)).unwrap()
}

async fn post(client: &reqwest::Client, base: &str, body: Value) -> Value {
    let resp = client
        .post(format!("{base}/api/comment"))
        .bearer_auth(token())
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_alive() {
    let (base, _) = spawn_bearer_server().await;
    let resp = make_client()
        .get(format!("{base}/api/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["content-type"],
        "application/json; charset=UTF-8"
    );
    assert_eq!(resp.text().await.unwrap(), r#"{"Message":"I am alive"}"#);
}

// ---------------------------------------------------------------------------
// Create and read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn post_then_get_round_trips() {
    let (base, _) = spawn_bearer_server().await;
    let client = make_client();

    let created = post(
        &client,
        &base,
        json!({ "slug": "/a", "author": "dude", "body": "hi" }),
    )
    .await;
    assert_eq!(created["slug"], "/a");
    assert_eq!(created["author"], "dude");
    assert_eq!(created["body"], "hi");
    let id = created["id"].as_u64().unwrap();
    assert_ne!(id, 0);

    let fetched: Value = client
        .get(format!("{base}/api/comment/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn post_ignores_supplied_id() {
    let (base, _) = spawn_bearer_server().await;
    let client = make_client();

    let first = post(&client, &base, json!({ "id": 500, "body": "one" })).await;
    let second = post(&client, &base, json!({ "id": 500, "body": "two" })).await;
    assert_ne!(first["id"], 500);
    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn seeded_comments_are_listed() {
    let (base, store) = spawn_bearer_server().await;
    store
        .insert(&CommentDraft::new("/seed", "from storage", "fixture"))
        .await
        .unwrap();

    let list: Vec<Value> = make_client()
        .get(format!("{base}/api/comment"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["body"], "from storage");
}

#[tokio::test]
async fn list_filters_by_slug() {
    let (base, _) = spawn_bearer_server().await;
    let client = make_client();
    post(&client, &base, json!({ "slug": "/a", "body": "on a" })).await;
    post(&client, &base, json!({ "slug": "/b", "body": "on b" })).await;
    post(&client, &base, json!({ "slug": "/a", "body": "also on a" })).await;

    let list: Vec<Value> = client
        .get(format!("{base}/api/comment"))
        .query(&[("slug", "/a")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|c| c["slug"] == "/a"));

    let none: Vec<Value> = client
        .get(format!("{base}/api/comment"))
        .query(&[("slug", "/missing")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(none.is_empty());
}

// ---------------------------------------------------------------------------
// Read errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_unknown_id_returns_404_envelope() {
    let (base, _) = spawn_bearer_server().await;
    let resp = make_client()
        .get(format!("{base}/api/comment/999999"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let v: Value = resp.json().await.unwrap();
    assert!(v["Message"].as_str().unwrap().contains("retriving"));
    assert!(!v["Error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn get_non_numeric_id_returns_400() {
    let (base, _) = spawn_bearer_server().await;
    let resp = make_client()
        .get(format!("{base}/api/comment/abc"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v: Value = resp.json().await.unwrap();
    assert_eq!(v["Message"], "unable to parse UINT from ID");
}

#[tokio::test]
async fn post_malformed_body_returns_400() {
    let (base, store) = spawn_bearer_server().await;
    let resp = make_client()
        .post(format!("{base}/api/comment"))
        .bearer_auth(token())
        .header("content-type", "application/json")
        .body("{\"slug\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v: Value = resp.json().await.unwrap();
    assert_eq!(v["Message"], "Failed to decode request body");
    assert!(store.find_all().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn put_merges_non_empty_fields() {
    let (base, _) = spawn_bearer_server().await;
    let client = make_client();
    let created = post(
        &client,
        &base,
        json!({ "slug": "/a", "author": "dude", "body": "old" }),
    )
    .await;
    let id = created["id"].as_u64().unwrap();

    let resp = client
        .put(format!("{base}/api/comment/{id}"))
        .bearer_auth(token())
        .json(&json!({ "body": "new" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["body"], "new");
    assert_eq!(updated["slug"], "/a");
    assert_eq!(updated["author"], "dude");

    let fetched: Value = client
        .get(format!("{base}/api/comment/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn put_unknown_id_returns_404() {
    let (base, _) = spawn_bearer_server().await;
    let resp = make_client()
        .put(format!("{base}/api/comment/424242"))
        .bearer_auth(token())
        .json(&json!({ "body": "new" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let v: Value = resp.json().await.unwrap();
    assert_eq!(v["Message"], "Failed to update comment");
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_then_get_and_repeat_delete_return_404() {
    let (base, _) = spawn_bearer_server().await;
    let client = make_client();
    let created = post(&client, &base, json!({ "slug": "/a", "body": "bye" })).await;
    let url = format!("{base}/api/comment/{}", created["id"]);

    let resp = client.delete(&url).bearer_auth(token()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v: Value = resp.json().await.unwrap();
    assert_eq!(v, json!({ "Message": "Successfully deleted comment." }));

    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client.delete(&url).bearer_auth(token()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Bearer auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn write_routes_without_token_return_401() {
    let (base, store) = spawn_bearer_server().await;
    let seeded = store
        .insert(&CommentDraft::new("/a", "keep me", "x"))
        .await
        .unwrap();
    let client = make_client();
    let item = format!("{base}/api/comment/{}", seeded.id);

    let requests = [
        client
            .post(format!("{base}/api/comment"))
            .json(&json!({ "body": "x" })),
        client.put(&item).json(&json!({ "body": "changed" })),
        client.delete(&item),
    ];
    for req in requests {
        let resp = req.send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let v: Value = resp.json().await.unwrap();
        assert_eq!(v["Message"], "not authorized");
    }

    let all = store.find_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].body, "keep me");
}

#[tokio::test]
async fn token_signed_with_other_secret_returns_401() {
    let (base, _) = spawn_bearer_server().await;
    let forged = issue_token(b"not-the-secret", "mallory", Duration::from_secs(300)).unwrap();
    let resp = make_client()
        .post(format!("{base}/api/comment"))
        .bearer_auth(forged)
        .json(&json!({ "body": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_token_returns_401() {
    let (base, store) = spawn_bearer_server().await;
    let resp = make_client()
        .post(format!("{base}/api/comment"))
        .bearer_auth("not.a.token")
        .json(&json!({ "body": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let v: Value = resp.json().await.unwrap();
    assert!(v["Error"].as_str().unwrap().starts_with("invalid token"));
    assert!(store.find_all().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Basic auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn basic_auth_accepts_configured_pair() {
    let (base, _) = spawn_basic_server().await;
    let resp = make_client()
        .post(format!("{base}/api/comment"))
        .basic_auth(TEST_USER, Some(TEST_PASSWORD))
        .json(&json!({ "slug": "/a", "body": "hi", "author": "dude" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v: Value = resp.json().await.unwrap();
    assert_eq!(v["body"], "hi");
}

#[tokio::test]
async fn basic_auth_rejects_wrong_password() {
    let (base, _) = spawn_basic_server().await;
    let resp = make_client()
        .post(format!("{base}/api/comment"))
        .basic_auth(TEST_USER, Some("wrong"))
        .json(&json!({ "body": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // A bearer token is not a basic credential.
    let resp = make_client()
        .post(format!("{base}/api/comment"))
        .bearer_auth(token())
        .json(&json!({ "body": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let (base, _) = spawn_bearer_server().await;
    let resp = make_client()
        .get(format!("{base}/api/comments"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
