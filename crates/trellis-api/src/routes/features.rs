//! Feature routes. Features are the immutable parent collections of work
//! items; soft-deleting one never cascades to its children.

use super::{require_feature, require_workspace, workspace_of_feature};
use crate::context::Requester;
use crate::error::ApiError;
use crate::response::{created, ok};
use crate::state::SharedState;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::Response;
use serde::Deserialize;
use trellis_core::access::ensure_workspace_access;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeatureBody {
    pub workspace_id: String,
    pub name: String,
    pub description: Option<String>,
}

/// `POST /features`
pub async fn create(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Json(body): Json<CreateFeatureBody>,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let workspace = require_workspace(&store, &body.workspace_id)?;
    ensure_workspace_access(&store, &workspace, &ctx)?;
    let feature = store.create_feature(&workspace.id, &body.name, body.description.as_deref())?;
    Ok(created(feature))
}

/// `GET /features/:id`
pub async fn show(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(feature_id): Path<String>,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let feature = require_feature(&store, &feature_id)?;
    let workspace = require_workspace(&store, &feature.workspace_id)?;
    ensure_workspace_access(&store, &workspace, &ctx)?;
    Ok(ok(feature))
}

/// `GET /workspaces/:id/features` — non-deleted, name order.
pub async fn list(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(workspace_id): Path<String>,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let workspace = require_workspace(&store, &workspace_id)?;
    ensure_workspace_access(&store, &workspace, &ctx)?;
    Ok(ok(store.list_features(&workspace.id)?))
}

/// `DELETE /features/:id` — soft delete; child work items are untouched.
pub async fn remove(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(feature_id): Path<String>,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let feature = require_feature(&store, &feature_id)?;
    let workspace = workspace_of_feature(&store, &feature.id)?;
    ensure_workspace_access(&store, &workspace, &ctx)?;
    store.soft_delete_feature(&feature.id)?;
    tracing::info!(feature = %feature.id, "feature soft-deleted");
    Ok(ok(serde_json::json!({ "deleted": true })))
}
