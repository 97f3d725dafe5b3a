//! The batch reorder service.
//!
//! Applies a caller-supplied list of `(item, order, phase?)` triples to
//! existing work items of one kind in a single all-or-nothing operation,
//! after authorizing the caller against the owning workspace. Shared by
//! the ticket and task reorder endpoints.
//!
//! Racing calls follow last-write-wins: both may succeed and the final
//! stored value is whichever committed last. The transaction inside
//! [`Store::apply_reorder`] is the only mutual-exclusion guarantee.

use crate::access::{RequesterContext, ensure_workspace_access};
use crate::db::Store;
use crate::error::{Error, Result};
use crate::model::{ItemKind, WorkItem};

/// One entry of a reorder batch.
///
/// `phase_id` distinguishes three wire shapes: absent (`None`, leave the
/// phase untouched), explicit null (`Some(None)`, clear it), and a value
/// (`Some(Some(..))`, move the item into that phase).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderEntry {
    pub id: String,
    pub order: i64,
    pub phase_id: Option<Option<String>>,
}

/// Apply a reorder batch.
///
/// 1. Resolve the workspace owning the first referenced item
///    (item -> feature -> workspace; the feature hop follows tombstoned
///    features so children of a soft-deleted feature stay reorderable).
/// 2. Authorize: owner or any active member.
/// 3. Require every entry to target the same feature as the anchor —
///    a batch spanning parent collections is rejected before any mutation.
/// 4. Rewrite all sort keys (and phases) in one transaction; an unknown
///    ID aborts with nothing written.
/// 5. Return the refreshed items of the anchor feature, ascending by
///    sort key.
///
/// Duplicate `order` values within a batch are accepted; the sort key has
/// no uniqueness constraint.
///
/// # Errors
///
/// - [`Error::Validation`] for an empty batch, a cross-feature batch, or
///   a phase belonging to another feature
/// - [`Error::Authorization`] for non-members
/// - [`Error::NotFound`] for unknown items or phases, or a deleted
///   workspace
/// - [`Error::Store`] when the backing store fails
pub fn reorder(
    store: &mut Store,
    ctx: &RequesterContext,
    kind: ItemKind,
    entries: &[ReorderEntry],
) -> Result<Vec<WorkItem>> {
    if entries.is_empty() {
        return Err(Error::validation(format!(
            "{} must be a non-empty array",
            kind.resource()
        )));
    }

    let anchor = store
        .item(kind, &entries[0].id)?
        .ok_or_else(|| Error::not_found(format!("{} {}", kind.noun(), entries[0].id)))?;

    let workspace_id = store
        .feature_workspace_id(&anchor.feature_id)?
        .ok_or_else(|| Error::not_found(format!("feature {}", anchor.feature_id)))?;
    let workspace = store
        .workspace(&workspace_id)?
        .ok_or_else(|| Error::not_found(format!("workspace {workspace_id}")))?;

    ensure_workspace_access(store, &workspace, ctx)?;

    for entry in &entries[1..] {
        let parent = store
            .item_parent(kind, &entry.id)?
            .ok_or_else(|| Error::not_found(format!("{} {}", kind.noun(), entry.id)))?;
        if parent != anchor.feature_id {
            return Err(Error::validation(format!(
                "all {} in a batch must belong to the same feature",
                kind.resource()
            )));
        }
    }

    // Phase pointers are caller input too; resolve them before any write.
    for entry in entries {
        if let Some(Some(phase)) = &entry.phase_id {
            store.ensure_phase_in_feature(phase, &anchor.feature_id)?;
        }
    }

    store.apply_reorder(kind, entries)?;

    tracing::debug!(
        kind = %kind,
        feature = %anchor.feature_id,
        count = entries.len(),
        "applied reorder batch"
    );

    store.list_items(&anchor.feature_id, kind)
}
