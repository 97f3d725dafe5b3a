//! Shared harness for router-level integration tests.
//!
//! Each test builds a router over a fresh in-memory store and drives it
//! with `tower::ServiceExt::oneshot`; no sockets involved.
#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use trellis_api::state::AppState;
use trellis_core::db::Store;

pub const OWNER: &str = "us-owner";

/// Router over a fresh, fully-migrated in-memory store.
pub fn app() -> Router {
    let store = Store::open_in_memory().expect("open in-memory store");
    trellis_api::routes::router(AppState::shared(store))
}

/// Fire one request; returns status and parsed JSON body (Null if empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };

    let response = app.clone().oneshot(request).await.expect("roundtrip");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

/// Extract the `data` payload from a success envelope, asserting shape.
pub fn data(body: &Value) -> &Value {
    assert_eq!(body["success"], Value::Bool(true), "envelope: {body}");
    &body["data"]
}

fn id_of(body: &Value) -> String {
    data(body)["id"]
        .as_str()
        .unwrap_or_else(|| panic!("missing id in {body}"))
        .to_string()
}

/// Create a workspace owned by `owner`, returning its ID.
pub async fn create_workspace(app: &Router, owner: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/workspaces",
        Some(owner),
        Some(serde_json::json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create workspace: {body}");
    id_of(&body)
}

/// Create a feature inside a workspace, returning its ID.
pub async fn create_feature(app: &Router, user: &str, workspace_id: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/features",
        Some(user),
        Some(serde_json::json!({ "workspaceId": workspace_id, "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create feature: {body}");
    id_of(&body)
}

/// Create a phase inside a feature, returning its ID.
pub async fn create_phase(app: &Router, user: &str, feature_id: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/phases",
        Some(user),
        Some(serde_json::json!({ "featureId": feature_id, "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create phase: {body}");
    id_of(&body)
}

/// Create a work item (`resource` = "tickets" or "tasks"), returning its ID.
pub async fn create_item(
    app: &Router,
    user: &str,
    resource: &str,
    feature_id: &str,
    title: &str,
    phase_id: Option<&str>,
) -> String {
    let mut payload = serde_json::json!({ "featureId": feature_id, "title": title });
    if let Some(phase_id) = phase_id {
        payload["phaseId"] = serde_json::json!(phase_id);
    }
    let (status, body) = send(app, "POST", &format!("/{resource}"), Some(user), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "create item: {body}");
    id_of(&body)
}

/// List a feature's items, returning `(id, order)` pairs in listing order.
pub async fn listed_orders(
    app: &Router,
    user: &str,
    resource: &str,
    feature_id: &str,
) -> Vec<(String, i64)> {
    let (status, body) = send(
        app,
        "GET",
        &format!("/features/{feature_id}/{resource}"),
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "list items: {body}");
    data(&body)
        .as_array()
        .expect("data is an array")
        .iter()
        .map(|item| {
            (
                item["id"].as_str().expect("id").to_string(),
                item["order"].as_i64().expect("order"),
            )
        })
        .collect()
}
