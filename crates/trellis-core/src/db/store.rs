//! Typed store operations over the SQLite connection.
//!
//! All methods take `&self` (or `&mut self` for transactional writes) and
//! return typed model structs, never raw rows. Soft-deleted rows are
//! filtered out of every getter except where the traversal contract needs
//! them (dangling parent features, see [`Store::feature_workspace_id`]).

use crate::error::{Error, Result};
use crate::model::{
    Feature, ItemKind, Member, Phase, PhaseStatus, Role, WorkItem, Workspace, id,
};
use crate::reorder::ReorderEntry;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use std::str::FromStr;

pub(crate) fn now_us() -> i64 {
    Utc::now().timestamp_micros()
}

fn parse_col<T>(idx: usize, value: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(error))
    })
}

const WORKSPACE_COLS: &str =
    "workspace_id, name, owner_id, is_deleted, deleted_at_us, created_at_us, updated_at_us";

const FEATURE_COLS: &str = "feature_id, workspace_id, name, description, is_deleted, \
     deleted_at_us, created_at_us, updated_at_us";

const PHASE_COLS: &str = "phase_id, feature_id, name, status, is_deleted, deleted_at_us, \
     created_at_us, updated_at_us";

const ITEM_COLS: &str = "item_id, kind, feature_id, phase_id, title, description, status, \
     sort_order, is_deleted, deleted_at_us, created_at_us, updated_at_us";

fn map_workspace(row: &Row<'_>) -> rusqlite::Result<Workspace> {
    Ok(Workspace {
        id: row.get(0)?,
        name: row.get(1)?,
        owner_id: row.get(2)?,
        is_deleted: row.get(3)?,
        deleted_at_us: row.get(4)?,
        created_at_us: row.get(5)?,
        updated_at_us: row.get(6)?,
    })
}

fn map_feature(row: &Row<'_>) -> rusqlite::Result<Feature> {
    Ok(Feature {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        is_deleted: row.get(4)?,
        deleted_at_us: row.get(5)?,
        created_at_us: row.get(6)?,
        updated_at_us: row.get(7)?,
    })
}

fn map_phase(row: &Row<'_>) -> rusqlite::Result<Phase> {
    let status: String = row.get(3)?;
    Ok(Phase {
        id: row.get(0)?,
        feature_id: row.get(1)?,
        name: row.get(2)?,
        status: parse_col(3, &status)?,
        is_deleted: row.get(4)?,
        deleted_at_us: row.get(5)?,
        created_at_us: row.get(6)?,
        updated_at_us: row.get(7)?,
    })
}

fn map_item(row: &Row<'_>) -> rusqlite::Result<WorkItem> {
    let kind: String = row.get(1)?;
    let status: String = row.get(6)?;
    Ok(WorkItem {
        id: row.get(0)?,
        kind: parse_col(1, &kind)?,
        feature_id: row.get(2)?,
        phase_id: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        status: parse_col(6, &status)?,
        order: row.get(7)?,
        is_deleted: row.get(8)?,
        deleted_at_us: row.get(9)?,
        created_at_us: row.get(10)?,
        updated_at_us: row.get(11)?,
    })
}

/// The relational store. Owns one SQLite connection; transactional writes
/// take `&mut self` so the borrow checker enforces exclusive access for
/// the duration of the transaction.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Wrap an already-configured connection.
    pub(crate) fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open a fully-migrated in-memory store. Intended for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if opening or migrating fails.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        super::configure_connection(&conn)?;
        super::migrations::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection (pragma inspection, test setup).
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    // -----------------------------------------------------------------------
    // Workspaces and membership
    // -----------------------------------------------------------------------

    /// Insert a workspace owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank name, or a store error.
    pub fn create_workspace(&self, name: &str, owner_id: &str) -> Result<Workspace> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("name must not be empty"));
        }

        let workspace_id = id::workspace_id();
        let now = now_us();
        self.conn.execute(
            "INSERT INTO workspaces (workspace_id, name, owner_id, created_at_us, updated_at_us)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![workspace_id, name, owner_id, now],
        )?;

        self.workspace(&workspace_id)?
            .ok_or_else(|| Error::not_found(format!("workspace {workspace_id}")))
    }

    /// Fetch a non-deleted workspace by ID.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub fn workspace(&self, workspace_id: &str) -> Result<Option<Workspace>> {
        let found = self
            .conn
            .query_row(
                &format!(
                    "SELECT {WORKSPACE_COLS} FROM workspaces
                     WHERE workspace_id = ?1 AND is_deleted = 0"
                ),
                params![workspace_id],
                map_workspace,
            )
            .optional()?;
        Ok(found)
    }

    /// Tombstone a workspace. Returns `false` if it was already deleted or
    /// never existed.
    ///
    /// # Errors
    ///
    /// Returns a store error if the update fails.
    pub fn soft_delete_workspace(&self, workspace_id: &str) -> Result<bool> {
        let now = now_us();
        let changed = self.conn.execute(
            "UPDATE workspaces
             SET is_deleted = 1, deleted_at_us = ?1, updated_at_us = ?1
             WHERE workspace_id = ?2 AND is_deleted = 0",
            params![now, workspace_id],
        )?;
        Ok(changed > 0)
    }

    /// Upsert an active membership.
    ///
    /// # Errors
    ///
    /// Returns a store error if the write fails.
    pub fn add_member(&self, workspace_id: &str, user_id: &str, role: Role) -> Result<Member> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(Error::validation("userId must not be empty"));
        }

        let now = now_us();
        self.conn.execute(
            "INSERT INTO workspace_members (workspace_id, user_id, role, is_active, created_at_us)
             VALUES (?1, ?2, ?3, 1, ?4)
             ON CONFLICT (workspace_id, user_id)
             DO UPDATE SET role = excluded.role, is_active = 1",
            params![workspace_id, user_id, role.to_string(), now],
        )?;

        let member = self.conn.query_row(
            "SELECT workspace_id, user_id, role, is_active, created_at_us
             FROM workspace_members
             WHERE workspace_id = ?1 AND user_id = ?2",
            params![workspace_id, user_id],
            |row| {
                let role: String = row.get(2)?;
                Ok(Member {
                    workspace_id: row.get(0)?,
                    user_id: row.get(1)?,
                    role: parse_col(2, &role)?,
                    is_active: row.get(3)?,
                    created_at_us: row.get(4)?,
                })
            },
        )?;
        Ok(member)
    }

    /// Role of an *active* member, or `None` for non-members and
    /// deactivated memberships. The workspace owner is not required to
    /// hold a membership row.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub fn member_role(&self, workspace_id: &str, user_id: &str) -> Result<Option<Role>> {
        let role: Option<String> = self
            .conn
            .query_row(
                "SELECT role FROM workspace_members
                 WHERE workspace_id = ?1 AND user_id = ?2 AND is_active = 1",
                params![workspace_id, user_id],
                |row| row.get(0),
            )
            .optional()?;

        match role {
            Some(raw) => Ok(Some(parse_col(0, &raw)?)),
            None => Ok(None),
        }
    }

    // -----------------------------------------------------------------------
    // Features
    // -----------------------------------------------------------------------

    /// Insert a feature into a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank name, or a store error.
    pub fn create_feature(
        &self,
        workspace_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Feature> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("name must not be empty"));
        }

        let feature_id = id::feature_id();
        let now = now_us();
        self.conn.execute(
            "INSERT INTO features (feature_id, workspace_id, name, description,
                                   created_at_us, updated_at_us)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![feature_id, workspace_id, name, description, now],
        )?;

        self.feature(&feature_id)?
            .ok_or_else(|| Error::not_found(format!("feature {feature_id}")))
    }

    /// Fetch a non-deleted feature by ID.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub fn feature(&self, feature_id: &str) -> Result<Option<Feature>> {
        let found = self
            .conn
            .query_row(
                &format!(
                    "SELECT {FEATURE_COLS} FROM features
                     WHERE feature_id = ?1 AND is_deleted = 0"
                ),
                params![feature_id],
                map_feature,
            )
            .optional()?;
        Ok(found)
    }

    /// Owning workspace of a feature, following even soft-deleted feature
    /// rows. Reorder traverses item -> feature -> workspace and must keep
    /// working for children of a tombstoned feature.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub fn feature_workspace_id(&self, feature_id: &str) -> Result<Option<String>> {
        let found = self
            .conn
            .query_row(
                "SELECT workspace_id FROM features WHERE feature_id = ?1",
                params![feature_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found)
    }

    /// Non-deleted features of a workspace, name order.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub fn list_features(&self, workspace_id: &str) -> Result<Vec<Feature>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FEATURE_COLS} FROM features
             WHERE workspace_id = ?1 AND is_deleted = 0
             ORDER BY name, feature_id"
        ))?;
        let features = stmt
            .query_map(params![workspace_id], map_feature)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(features)
    }

    /// Tombstone a feature. Child work items are left untouched: their
    /// `feature_id` becomes a dangling but valid pointer.
    ///
    /// # Errors
    ///
    /// Returns a store error if the update fails.
    pub fn soft_delete_feature(&self, feature_id: &str) -> Result<bool> {
        let now = now_us();
        let changed = self.conn.execute(
            "UPDATE features
             SET is_deleted = 1, deleted_at_us = ?1, updated_at_us = ?1
             WHERE feature_id = ?2 AND is_deleted = 0",
            params![now, feature_id],
        )?;
        Ok(changed > 0)
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    /// Insert a phase into a feature, starting as `pending`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank name, or a store error.
    pub fn create_phase(&self, feature_id: &str, name: &str) -> Result<Phase> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("name must not be empty"));
        }

        let phase_id = id::phase_id();
        let now = now_us();
        self.conn.execute(
            "INSERT INTO phases (phase_id, feature_id, name, created_at_us, updated_at_us)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![phase_id, feature_id, name, now],
        )?;

        self.phase(&phase_id)?
            .ok_or_else(|| Error::not_found(format!("phase {phase_id}")))
    }

    /// Fetch a non-deleted phase by ID.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub fn phase(&self, phase_id: &str) -> Result<Option<Phase>> {
        let found = self
            .conn
            .query_row(
                &format!("SELECT {PHASE_COLS} FROM phases WHERE phase_id = ?1 AND is_deleted = 0"),
                params![phase_id],
                map_phase,
            )
            .optional()?;
        Ok(found)
    }

    /// Persist a phase's mutable fields (name, status) and refresh it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank name,
    /// [`Error::NotFound`] if the phase vanished, or a store error.
    pub fn update_phase(&self, phase_id: &str, name: &str, status: PhaseStatus) -> Result<Phase> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("name must not be empty"));
        }

        let now = now_us();
        let changed = self.conn.execute(
            "UPDATE phases SET name = ?1, status = ?2, updated_at_us = ?3
             WHERE phase_id = ?4 AND is_deleted = 0",
            params![name, status.to_string(), now, phase_id],
        )?;
        if changed == 0 {
            return Err(Error::not_found(format!("phase {phase_id}")));
        }

        self.phase(phase_id)?
            .ok_or_else(|| Error::not_found(format!("phase {phase_id}")))
    }

    /// Require that a live phase exists and belongs to `feature_id`.
    /// Callers run this before writing a caller-supplied phase pointer so
    /// the failure surfaces as part of the error taxonomy instead of a
    /// foreign-key violation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown or deleted phase,
    /// [`Error::Validation`] for a phase of another feature, or a store
    /// error.
    pub fn ensure_phase_in_feature(&self, phase_id: &str, feature_id: &str) -> Result<()> {
        let phase = self
            .phase(phase_id)?
            .ok_or_else(|| Error::not_found(format!("phase {phase_id}")))?;
        if phase.feature_id != feature_id {
            return Err(Error::validation(format!(
                "phase {phase_id} does not belong to feature {feature_id}"
            )));
        }
        Ok(())
    }

    /// Tombstone a phase. Work items keep their `phase_id` pointer.
    ///
    /// # Errors
    ///
    /// Returns a store error if the update fails.
    pub fn soft_delete_phase(&self, phase_id: &str) -> Result<bool> {
        let now = now_us();
        let changed = self.conn.execute(
            "UPDATE phases
             SET is_deleted = 1, deleted_at_us = ?1, updated_at_us = ?1
             WHERE phase_id = ?2 AND is_deleted = 0",
            params![now, phase_id],
        )?;
        Ok(changed > 0)
    }

    // -----------------------------------------------------------------------
    // Work items
    // -----------------------------------------------------------------------

    /// Insert a work item with the default sort key:
    /// `max(sort_order of all siblings of the same feature and kind,
    /// including soft-deleted ones) + 1`, or `0` when no siblings exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank title, or a store error.
    pub fn create_item(
        &self,
        kind: ItemKind,
        feature_id: &str,
        phase_id: Option<&str>,
        title: &str,
        description: Option<&str>,
    ) -> Result<WorkItem> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::validation("title must not be empty"));
        }

        // Soft-deleted siblings still count so a revived sibling never
        // collides with a later default assignment.
        let next_order: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM work_items
             WHERE feature_id = ?1 AND kind = ?2",
            params![feature_id, kind.to_string()],
            |row| row.get(0),
        )?;

        let item_id = id::item_id();
        let now = now_us();
        self.conn.execute(
            "INSERT INTO work_items (item_id, kind, feature_id, phase_id, title,
                                     description, sort_order, created_at_us, updated_at_us)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                item_id,
                kind.to_string(),
                feature_id,
                phase_id,
                title,
                description,
                next_order,
                now
            ],
        )?;

        self.item(kind, &item_id)?
            .ok_or_else(|| Error::not_found(format!("{} {item_id}", kind.noun())))
    }

    /// Fetch a non-deleted work item by kind and ID.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub fn item(&self, kind: ItemKind, item_id: &str) -> Result<Option<WorkItem>> {
        let found = self
            .conn
            .query_row(
                &format!(
                    "SELECT {ITEM_COLS} FROM work_items
                     WHERE item_id = ?1 AND kind = ?2 AND is_deleted = 0"
                ),
                params![item_id, kind.to_string()],
                map_item,
            )
            .optional()?;
        Ok(found)
    }

    /// Parent feature of a non-deleted work item.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub fn item_parent(&self, kind: ItemKind, item_id: &str) -> Result<Option<String>> {
        let found = self
            .conn
            .query_row(
                "SELECT feature_id FROM work_items
                 WHERE item_id = ?1 AND kind = ?2 AND is_deleted = 0",
                params![item_id, kind.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found)
    }

    /// Non-deleted work items of one kind in a feature, ascending by sort
    /// key with insertion-order (rowid) tie-break.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub fn list_items(&self, feature_id: &str, kind: ItemKind) -> Result<Vec<WorkItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLS} FROM work_items
             WHERE feature_id = ?1 AND kind = ?2 AND is_deleted = 0
             ORDER BY sort_order, rowid"
        ))?;
        let items = stmt
            .query_map(params![feature_id, kind.to_string()], map_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Persist a work item's mutable fields (title, description, phase,
    /// status) and refresh it. `feature_id`, `kind`, and the sort key are
    /// immutable here; reorder is the only writer of `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank title,
    /// [`Error::NotFound`] if the item vanished, or a store error.
    pub fn update_item(&self, item: &WorkItem) -> Result<WorkItem> {
        let title = item.title.trim();
        if title.is_empty() {
            return Err(Error::validation("title must not be empty"));
        }

        let now = now_us();
        let changed = self.conn.execute(
            "UPDATE work_items
             SET title = ?1, description = ?2, phase_id = ?3, status = ?4, updated_at_us = ?5
             WHERE item_id = ?6 AND kind = ?7 AND is_deleted = 0",
            params![
                title,
                item.description,
                item.phase_id,
                item.status.to_string(),
                now,
                item.id,
                item.kind.to_string()
            ],
        )?;
        if changed == 0 {
            return Err(Error::not_found(format!("{} {}", item.kind.noun(), item.id)));
        }

        self.item(item.kind, &item.id)?
            .ok_or_else(|| Error::not_found(format!("{} {}", item.kind.noun(), item.id)))
    }

    /// Tombstone a work item.
    ///
    /// # Errors
    ///
    /// Returns a store error if the update fails.
    pub fn soft_delete_item(&self, kind: ItemKind, item_id: &str) -> Result<bool> {
        let now = now_us();
        let changed = self.conn.execute(
            "UPDATE work_items
             SET is_deleted = 1, deleted_at_us = ?1, updated_at_us = ?1
             WHERE item_id = ?2 AND kind = ?3 AND is_deleted = 0",
            params![now, item_id, kind.to_string()],
        )?;
        Ok(changed > 0)
    }

    /// Apply a reorder batch inside one transaction: every entry's sort key
    /// (and phase, when supplied) is rewritten by primary key, or none are.
    ///
    /// An entry that matches no live row aborts the transaction; the `Drop`
    /// of the uncommitted transaction rolls back every prior update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown item ID (full rollback),
    /// or a store error.
    pub fn apply_reorder(&mut self, kind: ItemKind, entries: &[ReorderEntry]) -> Result<()> {
        let tx = self.conn.transaction()?;
        let now = now_us();

        for entry in entries {
            let changed = match &entry.phase_id {
                Some(phase) => tx.execute(
                    "UPDATE work_items
                     SET sort_order = ?1, phase_id = ?2, updated_at_us = ?3
                     WHERE item_id = ?4 AND kind = ?5 AND is_deleted = 0",
                    params![entry.order, phase.as_deref(), now, entry.id, kind.to_string()],
                )?,
                None => tx.execute(
                    "UPDATE work_items
                     SET sort_order = ?1, updated_at_us = ?2
                     WHERE item_id = ?3 AND kind = ?4 AND is_deleted = 0",
                    params![entry.order, now, entry.id, kind.to_string()],
                )?,
            };

            if changed == 0 {
                return Err(Error::not_found(format!("{} {}", kind.noun(), entry.id)));
            }
        }

        tx.commit()?;
        Ok(())
    }
}
