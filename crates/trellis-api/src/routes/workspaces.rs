//! Workspace routes: create, fetch, soft delete, and member management.

use super::require_workspace;
use crate::context::Requester;
use crate::error::ApiError;
use crate::response::{created, ok};
use crate::state::SharedState;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::Response;
use serde::Deserialize;
use trellis_core::access::{ensure_workspace_access, ensure_workspace_owner};
use trellis_core::model::Role;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspaceBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberBody {
    pub user_id: String,
    pub role: Role,
}

/// `POST /workspaces` — the caller becomes the owner.
pub async fn create(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Json(body): Json<CreateWorkspaceBody>,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let workspace = store.create_workspace(&body.name, &ctx.user_id)?;
    tracing::info!(workspace = %workspace.id, owner = %ctx.user_id, "workspace created");
    Ok(created(workspace))
}

/// `GET /workspaces/:id` — owner or active member.
pub async fn show(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(workspace_id): Path<String>,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let workspace = require_workspace(&store, &workspace_id)?;
    ensure_workspace_access(&store, &workspace, &ctx)?;
    Ok(ok(workspace))
}

/// `DELETE /workspaces/:id` — owner only; soft delete.
pub async fn remove(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(workspace_id): Path<String>,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let workspace = require_workspace(&store, &workspace_id)?;
    ensure_workspace_owner(&workspace, &ctx)?;
    store.soft_delete_workspace(&workspace.id)?;
    tracing::info!(workspace = %workspace.id, "workspace soft-deleted");
    Ok(ok(serde_json::json!({ "deleted": true })))
}

/// `POST /workspaces/:id/members` — owner only.
pub async fn add_member(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(workspace_id): Path<String>,
    Json(body): Json<AddMemberBody>,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let workspace = require_workspace(&store, &workspace_id)?;
    ensure_workspace_owner(&workspace, &ctx)?;
    let member = store.add_member(&workspace.id, &body.user_id, body.role)?;
    Ok(created(member))
}
