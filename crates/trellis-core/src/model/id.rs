//! Opaque prefixed identifiers.
//!
//! IDs are UUIDv7 hex with a short type prefix (`ws-`, `ft-`, `ph-`,
//! `wi-`). UUIDv7 embeds a timestamp, so IDs sort roughly by creation
//! time, which keeps insertion-order tie-breaks stable in listings.

use uuid::Uuid;

fn prefixed(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7().simple())
}

/// New workspace ID (`ws-…`).
#[must_use]
pub fn workspace_id() -> String {
    prefixed("ws")
}

/// New feature ID (`ft-…`).
#[must_use]
pub fn feature_id() -> String {
    prefixed("ft")
}

/// New phase ID (`ph-…`).
#[must_use]
pub fn phase_id() -> String {
    prefixed("ph")
}

/// New work item ID (`wi-…`), shared by tickets and tasks.
#[must_use]
pub fn item_id() -> String {
    prefixed("wi")
}

#[cfg(test)]
mod tests {
    use super::{feature_id, item_id, phase_id, workspace_id};

    #[test]
    fn ids_carry_type_prefixes() {
        assert!(workspace_id().starts_with("ws-"));
        assert!(feature_id().starts_with("ft-"));
        assert!(phase_id().starts_with("ph-"));
        assert!(item_id().starts_with("wi-"));
    }

    #[test]
    fn ids_are_unique() {
        let a = item_id();
        let b = item_id();
        assert_ne!(a, b);
    }
}
