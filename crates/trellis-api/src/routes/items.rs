//! Work item routes, one resource per kind (`/tickets`, `/tasks`), plus
//! the batch reorder endpoints backed by the core reorder service.

use super::{require_feature, require_workspace, workspace_of_feature};
use crate::context::Requester;
use crate::error::ApiError;
use crate::response::{created, ok};
use crate::state::SharedState;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::Response;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use trellis_core::access::{RequesterContext, ensure_workspace_access};
use trellis_core::db::Store;
use trellis_core::model::{ItemKind, WorkItem, WorkflowStatus};
use trellis_core::reorder::{ReorderEntry, reorder};
use trellis_core::{Error, Result as CoreResult};

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemBody {
    pub feature_id: String,
    pub title: String,
    pub description: Option<String>,
    pub phase_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemBody {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phase_id: Option<Option<String>>,
    pub status: Option<WorkflowStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReorderEntryBody {
    id: String,
    order: i64,
    #[serde(default, deserialize_with = "double_option")]
    phase_id: Option<Option<String>>,
}

impl From<ReorderEntryBody> for ReorderEntry {
    fn from(body: ReorderEntryBody) -> Self {
        Self {
            id: body.id,
            order: body.order,
            phase_id: body.phase_id,
        }
    }
}

fn require_item(store: &Store, kind: ItemKind, item_id: &str) -> Result<WorkItem, ApiError> {
    store
        .item(kind, item_id)?
        .ok_or_else(|| ApiError::from(Error::not_found(format!("{} {item_id}", kind.noun()))))
}

// ---------------------------------------------------------------------------
// Kind-generic handlers
// ---------------------------------------------------------------------------

fn create_item(
    state: &SharedState,
    ctx: &RequesterContext,
    kind: ItemKind,
    body: &CreateItemBody,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let feature = require_feature(&store, &body.feature_id)?;
    let workspace = require_workspace(&store, &feature.workspace_id)?;
    ensure_workspace_access(&store, &workspace, ctx)?;
    if let Some(phase) = &body.phase_id {
        store.ensure_phase_in_feature(phase, &feature.id)?;
    }

    let item = store.create_item(
        kind,
        &feature.id,
        body.phase_id.as_deref(),
        &body.title,
        body.description.as_deref(),
    )?;
    tracing::debug!(item = %item.id, kind = %kind, order = item.order, "work item created");
    Ok(created(item))
}

fn show_item(
    state: &SharedState,
    ctx: &RequesterContext,
    kind: ItemKind,
    item_id: &str,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let item = require_item(&store, kind, item_id)?;
    let workspace = workspace_of_feature(&store, &item.feature_id)?;
    ensure_workspace_access(&store, &workspace, ctx)?;
    Ok(ok(item))
}

fn list_items(
    state: &SharedState,
    ctx: &RequesterContext,
    kind: ItemKind,
    feature_id: &str,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let feature = require_feature(&store, feature_id)?;
    let workspace = require_workspace(&store, &feature.workspace_id)?;
    ensure_workspace_access(&store, &workspace, ctx)?;
    Ok(ok(store.list_items(&feature.id, kind)?))
}

fn update_item(
    state: &SharedState,
    ctx: &RequesterContext,
    kind: ItemKind,
    item_id: &str,
    body: UpdateItemBody,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let mut item = require_item(&store, kind, item_id)?;
    let workspace = workspace_of_feature(&store, &item.feature_id)?;
    ensure_workspace_access(&store, &workspace, ctx)?;

    if let Some(target) = body.status {
        item.status
            .can_transition_to(target)
            .map_err(|err| Error::conflict(err.to_string()))?;
        item.status = target;
    }
    if let Some(title) = body.title {
        item.title = title;
    }
    if let Some(description) = body.description {
        item.description = description;
    }
    if let Some(phase_id) = body.phase_id {
        if let Some(phase) = &phase_id {
            store.ensure_phase_in_feature(phase, &item.feature_id)?;
        }
        item.phase_id = phase_id;
    }

    Ok(ok(store.update_item(&item)?))
}

fn remove_item(
    state: &SharedState,
    ctx: &RequesterContext,
    kind: ItemKind,
    item_id: &str,
) -> Result<Response, ApiError> {
    let store = state.store.lock();
    let item = require_item(&store, kind, item_id)?;
    let workspace = workspace_of_feature(&store, &item.feature_id)?;
    ensure_workspace_access(&store, &workspace, ctx)?;
    store.soft_delete_item(kind, &item.id)?;
    Ok(ok(serde_json::json!({ "deleted": true })))
}

/// Parse `{ "<resource>": [ {id, order, phaseId?}, … ] }`. Anything that
/// is not a non-empty array under the resource key is a validation error
/// with the documented message.
fn parse_reorder_batch(kind: ItemKind, payload: &Value) -> CoreResult<Vec<ReorderEntry>> {
    let empty_or_missing = || {
        Error::validation(format!(
            "{} must be a non-empty array",
            kind.resource()
        ))
    };

    let Some(Value::Array(raw)) = payload.get(kind.resource()) else {
        return Err(empty_or_missing());
    };
    if raw.is_empty() {
        return Err(empty_or_missing());
    }

    let bodies: Vec<ReorderEntryBody> = serde_json::from_value(Value::Array(raw.clone()))
        .map_err(|err| Error::validation(format!("invalid {} payload: {err}", kind.resource())))?;
    Ok(bodies.into_iter().map(Into::into).collect())
}

fn reorder_items(
    state: &SharedState,
    ctx: &RequesterContext,
    kind: ItemKind,
    payload: &Value,
) -> Result<Response, ApiError> {
    let entries = parse_reorder_batch(kind, payload)?;
    let mut store = state.store.lock();
    let items = reorder(&mut store, ctx, kind, &entries)?;
    Ok(ok(items))
}

// ---------------------------------------------------------------------------
// Ticket endpoints
// ---------------------------------------------------------------------------

pub async fn create_ticket(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Json(body): Json<CreateItemBody>,
) -> Result<Response, ApiError> {
    create_item(&state, &ctx, ItemKind::Ticket, &body)
}

pub async fn show_ticket(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(item_id): Path<String>,
) -> Result<Response, ApiError> {
    show_item(&state, &ctx, ItemKind::Ticket, &item_id)
}

pub async fn list_tickets(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(feature_id): Path<String>,
) -> Result<Response, ApiError> {
    list_items(&state, &ctx, ItemKind::Ticket, &feature_id)
}

pub async fn update_ticket(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(item_id): Path<String>,
    Json(body): Json<UpdateItemBody>,
) -> Result<Response, ApiError> {
    update_item(&state, &ctx, ItemKind::Ticket, &item_id, body)
}

pub async fn remove_ticket(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(item_id): Path<String>,
) -> Result<Response, ApiError> {
    remove_item(&state, &ctx, ItemKind::Ticket, &item_id)
}

pub async fn reorder_tickets(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    reorder_items(&state, &ctx, ItemKind::Ticket, &payload)
}

// ---------------------------------------------------------------------------
// Task endpoints
// ---------------------------------------------------------------------------

pub async fn create_task(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Json(body): Json<CreateItemBody>,
) -> Result<Response, ApiError> {
    create_item(&state, &ctx, ItemKind::Task, &body)
}

pub async fn show_task(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(item_id): Path<String>,
) -> Result<Response, ApiError> {
    show_item(&state, &ctx, ItemKind::Task, &item_id)
}

pub async fn list_tasks(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(feature_id): Path<String>,
) -> Result<Response, ApiError> {
    list_items(&state, &ctx, ItemKind::Task, &feature_id)
}

pub async fn update_task(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(item_id): Path<String>,
    Json(body): Json<UpdateItemBody>,
) -> Result<Response, ApiError> {
    update_item(&state, &ctx, ItemKind::Task, &item_id, body)
}

pub async fn remove_task(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Path(item_id): Path<String>,
) -> Result<Response, ApiError> {
    remove_item(&state, &ctx, ItemKind::Task, &item_id)
}

pub async fn reorder_tasks(
    State(state): State<SharedState>,
    Requester(ctx): Requester,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    reorder_items(&state, &ctx, ItemKind::Task, &payload)
}
