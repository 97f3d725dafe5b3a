//! Phase routes: the optional grouping of work items inside a feature.

use super::{require_feature, workspace_of_feature};
use crate::context::Requester;
use crate::error::ApiError;
use crate::response::{created, ok};
use crate::state::SharedState;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::Response;
use serde::Deserialize;
use trellis_core::Error;
use trellis_core::access::ensure_workspace_access;
use trellis_core::model::PhaseStatus;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePhaseBody {
    pub feature_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhaseBody {
    pub name: Option<String>,
    pub status: Option<PhaseStatus>,
}

/// `POST /phases`
pub async fn create(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Json(body): Json<CreatePhaseBody>,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let feature = require_feature(&store, &body.feature_id)?;
    let workspace = workspace_of_feature(&store, &feature.id)?;
    ensure_workspace_access(&store, &workspace, &ctx)?;
    let phase = store.create_phase(&feature.id, &body.name)?;
    Ok(created(phase))
}

/// `PATCH /phases/:id` — rename and/or transition status. A transition
/// outside the lifecycle rules is a conflict (409).
pub async fn update(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(phase_id): Path<String>,
    Json(body): Json<UpdatePhaseBody>,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let phase = store
        .phase(&phase_id)?
        .ok_or_else(|| ApiError::from(Error::not_found(format!("phase {phase_id}"))))?;
    let workspace = workspace_of_feature(&store, &phase.feature_id)?;
    ensure_workspace_access(&store, &workspace, &ctx)?;

    let status = match body.status {
        Some(target) => {
            phase
                .status
                .can_transition_to(target)
                .map_err(|err| Error::conflict(err.to_string()))?;
            target
        }
        None => phase.status,
    };
    let name = body.name.as_deref().unwrap_or(&phase.name);

    let updated = store.update_phase(&phase.id, name, status)?;
    Ok(ok(updated))
}

/// `DELETE /phases/:id` — soft delete; items keep their phase pointer.
pub async fn remove(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(phase_id): Path<String>,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let phase = store
        .phase(&phase_id)?
        .ok_or_else(|| ApiError::from(Error::not_found(format!("phase {phase_id}"))))?;
    let workspace = workspace_of_feature(&store, &phase.feature_id)?;
    ensure_workspace_access(&store, &workspace, &ctx)?;
    store.soft_delete_phase(&phase.id)?;
    Ok(ok(serde_json::json!({ "deleted": true })))
}
