//! Typed domain model: workspaces, features, phases, and work items.

pub mod feature;
pub mod id;
pub mod item;
pub mod phase;
pub mod workspace;

pub use feature::Feature;
pub use item::{InvalidStatusTransition, ItemKind, WorkItem, WorkflowStatus};
pub use phase::{InvalidPhaseTransition, Phase, PhaseStatus};
pub use workspace::{Member, Role, Workspace};

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl std::fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

pub(crate) fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}
