//! Work-item CRUD behavior over the HTTP surface: default ordering,
//! status transitions, and soft-delete semantics.

mod support;

use axum::http::StatusCode;
use support::{OWNER, app, create_feature, create_item, create_phase, create_workspace, data,
    listed_orders, send};

#[tokio::test]
async fn default_orders_count_up_per_feature_and_kind() {
    let app = app();
    let workspace = create_workspace(&app, OWNER, "Acme").await;
    let checkout = create_feature(&app, OWNER, &workspace, "Checkout").await;
    let billing = create_feature(&app, OWNER, &workspace, "Billing").await;

    let a = create_item(&app, OWNER, "tickets", &checkout, "A", None).await;
    let b = create_item(&app, OWNER, "tickets", &checkout, "B", None).await;
    // A task in the same feature starts its own sequence.
    let t = create_item(&app, OWNER, "tasks", &checkout, "T", None).await;
    // As does a ticket in a sibling feature.
    let other = create_item(&app, OWNER, "tickets", &billing, "Other", None).await;

    assert_eq!(
        listed_orders(&app, OWNER, "tickets", &checkout).await,
        vec![(a, 0), (b, 1)]
    );
    assert_eq!(
        listed_orders(&app, OWNER, "tasks", &checkout).await,
        vec![(t, 0)]
    );
    assert_eq!(
        listed_orders(&app, OWNER, "tickets", &billing).await,
        vec![(other, 0)]
    );
}

#[tokio::test]
async fn deleted_sibling_still_advances_the_default_order() {
    let app = app();
    let workspace = create_workspace(&app, OWNER, "Acme").await;
    let feature = create_feature(&app, OWNER, &workspace, "Checkout").await;

    let first = create_item(&app, OWNER, "tickets", &feature, "First", None).await;
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/tickets/{first}"),
        Some(OWNER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The tombstone keeps order 0 occupied.
    let second = create_item(&app, OWNER, "tickets", &feature, "Second", None).await;
    assert_eq!(
        listed_orders(&app, OWNER, "tickets", &feature).await,
        vec![(second, 1)]
    );
}

#[tokio::test]
async fn a_ticket_and_task_do_not_share_an_id_space() {
    let app = app();
    let workspace = create_workspace(&app, OWNER, "Acme").await;
    let feature = create_feature(&app, OWNER, &workspace, "Checkout").await;
    let ticket = create_item(&app, OWNER, "tickets", &feature, "Only", None).await;

    // The ticket's ID is invisible through the task resource.
    let (status, body) = send(&app, "GET", &format!("/tasks/{ticket}"), Some(OWNER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
}

#[tokio::test]
async fn status_walks_the_workflow_and_rejects_skips() {
    let app = app();
    let workspace = create_workspace(&app, OWNER, "Acme").await;
    let feature = create_feature(&app, OWNER, &workspace, "Checkout").await;
    let ticket = create_item(&app, OWNER, "tickets", &feature, "Walk", None).await;

    // backlog -> done skips the workflow.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tickets/{ticket}"),
        Some(OWNER),
        Some(serde_json::json!({ "status": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert!(body["error"].as_str().expect("error").contains("backlog"));

    for step in ["in_progress", "review", "done"] {
        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/tickets/{ticket}"),
            Some(OWNER),
            Some(serde_json::json!({ "status": step })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(data(&body)["status"], serde_json::json!(step));
    }
}

#[tokio::test]
async fn patch_distinguishes_null_from_absent() {
    let app = app();
    let workspace = create_workspace(&app, OWNER, "Acme").await;
    let feature = create_feature(&app, OWNER, &workspace, "Checkout").await;
    let phase = create_phase(&app, OWNER, &feature, "G1").await;
    let ticket = create_item(&app, OWNER, "tickets", &feature, "Orig", Some(&phase)).await;

    // Absent fields stay untouched.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tickets/{ticket}"),
        Some(OWNER),
        Some(serde_json::json!({ "title": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(data(&body)["title"], "Renamed");
    assert_eq!(data(&body)["phaseId"], serde_json::json!(phase));

    // Explicit null clears the pointer.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tickets/{ticket}"),
        Some(OWNER),
        Some(serde_json::json!({ "phaseId": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(data(&body)["phaseId"], serde_json::Value::Null);
    assert_eq!(data(&body)["title"], "Renamed");
}

#[tokio::test]
async fn deleting_a_feature_keeps_items_reachable_by_id() {
    let app = app();
    let workspace = create_workspace(&app, OWNER, "Acme").await;
    let feature = create_feature(&app, OWNER, &workspace, "Checkout").await;
    let ticket = create_item(&app, OWNER, "tickets", &feature, "Orphan", None).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/features/{feature}"),
        Some(OWNER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The feature itself is gone from the read path.
    let (status, _) = send(
        &app,
        "GET",
        &format!("/features/{feature}"),
        Some(OWNER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        "GET",
        &format!("/features/{feature}/tickets"),
        Some(OWNER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // No cascade: the child is still live and fully editable.
    let (status, body) = send(&app, "GET", &format!("/tickets/{ticket}"), Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(data(&body)["featureId"], serde_json::json!(feature));

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/tickets/{ticket}"),
        Some(OWNER),
        Some(serde_json::json!({ "title": "Still editable" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn deleted_items_drop_out_of_reads() {
    let app = app();
    let workspace = create_workspace(&app, OWNER, "Acme").await;
    let feature = create_feature(&app, OWNER, &workspace, "Checkout").await;
    let keep = create_item(&app, OWNER, "tickets", &feature, "Keep", None).await;
    let gone = create_item(&app, OWNER, "tickets", &feature, "Gone", None).await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/tickets/{gone}"),
        Some(OWNER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(data(&body)["deleted"], serde_json::Value::Bool(true));

    let (status, _) = send(&app, "GET", &format!("/tickets/{gone}"), Some(OWNER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        listed_orders(&app, OWNER, "tickets", &feature).await,
        vec![(keep, 0)]
    );
}

#[tokio::test]
async fn patching_a_blank_title_is_rejected() {
    let app = app();
    let workspace = create_workspace(&app, OWNER, "Acme").await;
    let feature = create_feature(&app, OWNER, &workspace, "Checkout").await;
    let ticket = create_item(&app, OWNER, "tickets", &feature, "Valid", None).await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tickets/{ticket}"),
        Some(OWNER),
        Some(serde_json::json!({ "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"], "title must not be empty");

    let (status, body) = send(&app, "GET", &format!("/tickets/{ticket}"), Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)["title"], "Valid");
}

#[tokio::test]
async fn phase_pointers_are_resolved_before_writing() {
    let app = app();
    let workspace = create_workspace(&app, OWNER, "Acme").await;
    let checkout = create_feature(&app, OWNER, &workspace, "Checkout").await;
    let billing = create_feature(&app, OWNER, &workspace, "Billing").await;
    let foreign_phase = create_phase(&app, OWNER, &billing, "Elsewhere").await;
    let ticket = create_item(&app, OWNER, "tickets", &checkout, "Anchored", None).await;

    // Creating against an unknown phase.
    let (status, body) = send(
        &app,
        "POST",
        "/tickets",
        Some(OWNER),
        Some(serde_json::json!({
            "featureId": checkout,
            "title": "Bad phase",
            "phaseId": "ph-does-not-exist",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");

    // Patching to an unknown phase.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tickets/{ticket}"),
        Some(OWNER),
        Some(serde_json::json!({ "phaseId": "ph-does-not-exist" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");

    // Patching to another feature's phase.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tickets/{ticket}"),
        Some(OWNER),
        Some(serde_json::json!({ "phaseId": foreign_phase })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert!(body["error"].as_str().expect("error").contains(&foreign_phase));

    let (status, body) = send(&app, "GET", &format!("/tickets/{ticket}"), Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)["phaseId"], serde_json::Value::Null);
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let app = app();
    let workspace = create_workspace(&app, OWNER, "Acme").await;
    let feature = create_feature(&app, OWNER, &workspace, "Checkout").await;

    let (status, body) = send(
        &app,
        "POST",
        "/tickets",
        Some(OWNER),
        Some(serde_json::json!({ "featureId": feature, "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert!(body["error"].as_str().expect("error").contains("title"));
}

#[tokio::test]
async fn phase_transitions_follow_the_lifecycle() {
    let app = app();
    let workspace = create_workspace(&app, OWNER, "Acme").await;
    let feature = create_feature(&app, OWNER, &workspace, "Checkout").await;
    let phase = create_phase(&app, OWNER, &feature, "G1").await;

    // pending -> complete skips activation.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/phases/{phase}"),
        Some(OWNER),
        Some(serde_json::json!({ "status": "complete" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    for step in ["active", "complete"] {
        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/phases/{phase}"),
            Some(OWNER),
            Some(serde_json::json!({ "status": step })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(data(&body)["status"], serde_json::json!(step));
    }
}
