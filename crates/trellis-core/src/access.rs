//! Workspace access control.
//!
//! Caller identity is always explicit: the transport layer resolves a user
//! ID (session, header, whatever the deployment uses) and hands it to the
//! core as a [`RequesterContext`]. Nothing here is ambient or thread-local.

use crate::db::Store;
use crate::error::{Error, Result};
use crate::model::Workspace;

/// The authenticated caller, as resolved by the upstream session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequesterContext {
    pub user_id: String,
}

impl RequesterContext {
    /// Wrap a resolved user ID.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Require that the caller is the workspace owner or an active member.
/// Any role suffices; membership alone is the gate.
///
/// # Errors
///
/// Returns [`Error::Authorization`] for non-members, or a store error.
pub fn ensure_workspace_access(
    store: &Store,
    workspace: &Workspace,
    ctx: &RequesterContext,
) -> Result<()> {
    if workspace.owner_id == ctx.user_id {
        return Ok(());
    }

    match store.member_role(&workspace.id, &ctx.user_id)? {
        Some(_) => Ok(()),
        None => Err(Error::Authorization),
    }
}

/// Require that the caller owns the workspace. Used for destructive
/// operations (workspace deletion, member management).
///
/// # Errors
///
/// Returns [`Error::Authorization`] for anyone but the owner.
pub fn ensure_workspace_owner(workspace: &Workspace, ctx: &RequesterContext) -> Result<()> {
    if workspace.owner_id == ctx.user_id {
        Ok(())
    } else {
        Err(Error::Authorization)
    }
}
