//! Router assembly and helpers shared across handlers.

pub mod features;
pub mod items;
pub mod phases;
pub mod workspaces;

use crate::error::ApiError;
use crate::state::SharedState;
use axum::Json;
use axum::Router;
use axum::routing::{get, patch, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use trellis_core::Error;
use trellis_core::db::Store;
use trellis_core::model::{Feature, Workspace};

/// Build the axum router with all routes.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/workspaces", post(workspaces::create))
        .route(
            "/workspaces/:id",
            get(workspaces::show).delete(workspaces::remove),
        )
        .route("/workspaces/:id/members", post(workspaces::add_member))
        .route("/workspaces/:id/features", get(features::list))
        .route("/features", post(features::create))
        .route("/features/:id", get(features::show).delete(features::remove))
        .route("/features/:id/tickets", get(items::list_tickets))
        .route("/features/:id/tasks", get(items::list_tasks))
        .route("/phases", post(phases::create))
        .route("/phases/:id", patch(phases::update).delete(phases::remove))
        .route("/tickets", post(items::create_ticket))
        .route("/tickets/reorder", post(items::reorder_tickets))
        .route(
            "/tickets/:id",
            get(items::show_ticket)
                .patch(items::update_ticket)
                .delete(items::remove_ticket),
        )
        .route("/tasks", post(items::create_task))
        .route("/tasks/reorder", post(items::reorder_tasks))
        .route(
            "/tasks/:id",
            get(items::show_task)
                .patch(items::update_task)
                .delete(items::remove_task),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Fetch a live workspace or 404.
pub(crate) fn require_workspace(store: &Store, workspace_id: &str) -> Result<Workspace, ApiError> {
    store
        .workspace(workspace_id)?
        .ok_or_else(|| ApiError::from(Error::not_found(format!("workspace {workspace_id}"))))
}

/// Fetch a live feature or 404.
pub(crate) fn require_feature(store: &Store, feature_id: &str) -> Result<Feature, ApiError> {
    store
        .feature(feature_id)?
        .ok_or_else(|| ApiError::from(Error::not_found(format!("feature {feature_id}"))))
}

/// Resolve the workspace that owns a feature, following tombstoned
/// features (children of a soft-deleted feature stay reachable by ID).
pub(crate) fn workspace_of_feature(store: &Store, feature_id: &str) -> Result<Workspace, ApiError> {
    let workspace_id = store
        .feature_workspace_id(feature_id)?
        .ok_or_else(|| ApiError::from(Error::not_found(format!("feature {feature_id}"))))?;
    require_workspace(store, &workspace_id)
}
