//! Canonical SQLite schema for trellis.
//!
//! The schema is normalized around the tenancy hierarchy:
//! - `workspaces` scopes everything; `workspace_members` models access
//! - `features` are the immutable parent collections of work items
//! - `phases` are the optional grouping inside a feature
//! - `work_items` holds both tickets and tasks, discriminated by `kind`,
//!   with a non-unique `sort_order` column as the sort key
//!
//! Soft delete everywhere: rows are tombstoned (`is_deleted`,
//! `deleted_at_us`), never removed. Soft-deleting a feature does not touch
//! its child work items.

/// Migration v1: core tables.
pub const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS workspaces (
    workspace_id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    owner_id TEXT NOT NULL CHECK (length(trim(owner_id)) > 0),
    is_deleted INTEGER NOT NULL DEFAULT 0 CHECK (is_deleted IN (0, 1)),
    deleted_at_us INTEGER,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (workspace_id LIKE 'ws-%')
);

CREATE TABLE IF NOT EXISTS workspace_members (
    workspace_id TEXT NOT NULL REFERENCES workspaces(workspace_id) ON DELETE CASCADE,
    user_id TEXT NOT NULL CHECK (length(trim(user_id)) > 0),
    role TEXT NOT NULL CHECK (role IN ('admin', 'editor', 'viewer')),
    is_active INTEGER NOT NULL DEFAULT 1 CHECK (is_active IN (0, 1)),
    created_at_us INTEGER NOT NULL,
    PRIMARY KEY (workspace_id, user_id)
);

CREATE TABLE IF NOT EXISTS features (
    feature_id TEXT PRIMARY KEY,
    workspace_id TEXT NOT NULL REFERENCES workspaces(workspace_id),
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    description TEXT,
    is_deleted INTEGER NOT NULL DEFAULT 0 CHECK (is_deleted IN (0, 1)),
    deleted_at_us INTEGER,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (feature_id LIKE 'ft-%')
);

CREATE TABLE IF NOT EXISTS phases (
    phase_id TEXT PRIMARY KEY,
    feature_id TEXT NOT NULL REFERENCES features(feature_id),
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'active', 'complete')),
    is_deleted INTEGER NOT NULL DEFAULT 0 CHECK (is_deleted IN (0, 1)),
    deleted_at_us INTEGER,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (phase_id LIKE 'ph-%')
);

CREATE TABLE IF NOT EXISTS work_items (
    item_id TEXT PRIMARY KEY,
    kind TEXT NOT NULL CHECK (kind IN ('ticket', 'task')),
    feature_id TEXT NOT NULL REFERENCES features(feature_id),
    phase_id TEXT REFERENCES phases(phase_id),
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    description TEXT,
    status TEXT NOT NULL DEFAULT 'backlog'
        CHECK (status IN ('backlog', 'in_progress', 'review', 'done')),
    sort_order INTEGER NOT NULL DEFAULT 0,
    is_deleted INTEGER NOT NULL DEFAULT 0 CHECK (is_deleted IN (0, 1)),
    deleted_at_us INTEGER,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (item_id LIKE 'wi-%')
);
"#;

/// Migration v2: read-path indexes.
pub const MIGRATION_V2_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_members_user
    ON workspace_members(user_id, workspace_id);

CREATE INDEX IF NOT EXISTS idx_features_workspace
    ON features(workspace_id, is_deleted);

CREATE INDEX IF NOT EXISTS idx_phases_feature
    ON phases(feature_id, is_deleted);

CREATE INDEX IF NOT EXISTS idx_items_feature_kind_order
    ON work_items(feature_id, kind, is_deleted, sort_order);

CREATE INDEX IF NOT EXISTS idx_items_phase
    ON work_items(phase_id);
"#;

/// Indexes expected by list/authorize query paths.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_members_user",
    "idx_features_workspace",
    "idx_phases_feature",
    "idx_items_feature_kind_order",
    "idx_items_phase",
];
