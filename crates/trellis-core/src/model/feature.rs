//! Feature records: the immutable parent collection of work items.
//!
//! A work item belongs to exactly one feature for its entire lifetime;
//! reorder never moves items across features. Soft-deleting a feature does
//! not cascade to its children — their `feature_id` becomes a dangling but
//! valid reference to the tombstoned row.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_deleted: bool,
    pub deleted_at_us: Option<i64>,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}
