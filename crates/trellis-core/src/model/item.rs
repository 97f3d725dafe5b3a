//! Work item records: the orderable tickets and tasks.

use super::{ParseEnumError, normalize};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The two kinds of orderable work item. Both share the same shape and
/// storage; the HTTP surface exposes one resource per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Ticket,
    Task,
}

impl ItemKind {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Ticket => "ticket",
            Self::Task => "task",
        }
    }

    /// Singular noun for error messages (`"ticket"` / `"task"`).
    #[must_use]
    pub const fn noun(self) -> &'static str {
        self.as_str()
    }

    /// Plural resource name used on the wire (`"tickets"` / `"tasks"`).
    #[must_use]
    pub const fn resource(self) -> &'static str {
        match self {
            Self::Ticket => "tickets",
            Self::Task => "tasks",
        }
    }
}

/// Workflow states for a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Backlog,
    InProgress,
    Review,
    Done,
}

impl WorkflowStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    /// Validate whether a transition from self to `target` is allowed.
    ///
    /// Valid transitions:
    /// - `backlog -> in_progress`
    /// - `in_progress -> review`
    /// - `in_progress -> backlog`
    /// - `review -> done`
    /// - `review -> in_progress`
    /// - `done -> in_progress` (reopen)
    pub fn can_transition_to(self, target: Self) -> Result<(), InvalidStatusTransition> {
        if self == target {
            return Err(InvalidStatusTransition {
                from: self,
                to: target,
                reason: "no-op transition is not allowed",
            });
        }

        let allowed = matches!(
            (self, target),
            (Self::Backlog, Self::InProgress)
                | (Self::InProgress, Self::Review)
                | (Self::InProgress, Self::Backlog)
                | (Self::Review, Self::Done)
                | (Self::Review, Self::InProgress)
                | (Self::Done, Self::InProgress)
        );

        if allowed {
            Ok(())
        } else {
            Err(InvalidStatusTransition {
                from: self,
                to: target,
                reason: "transition not allowed by workflow rules",
            })
        }
    }
}

/// Error returned when a workflow status transition is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidStatusTransition {
    pub from: WorkflowStatus,
    pub to: WorkflowStatus,
    pub reason: &'static str,
}

impl fmt::Display for InvalidStatusTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid status transition {} -> {}: {}",
            self.from, self.to, self.reason
        )
    }
}

impl std::error::Error for InvalidStatusTransition {}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "ticket" => Ok(Self::Ticket),
            "task" => Ok(Self::Task),
            _ => Err(ParseEnumError {
                expected: "item kind",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for WorkflowStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "backlog" => Ok(Self::Backlog),
            "in_progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => Err(ParseEnumError {
                expected: "workflow status",
                got: s.to_string(),
            }),
        }
    }
}

/// All persisted fields for a work item.
///
/// `order` is a signed sort key with no uniqueness constraint; duplicates
/// are valid and ties break by insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: String,
    pub kind: ItemKind,
    pub feature_id: String,
    pub phase_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: WorkflowStatus,
    pub order: i64,
    pub is_deleted: bool,
    pub deleted_at_us: Option<i64>,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

#[cfg(test)]
mod tests {
    use super::{InvalidStatusTransition, ItemKind, WorkflowStatus};
    use std::str::FromStr;

    #[test]
    fn enum_json_roundtrips() {
        assert_eq!(
            serde_json::to_string(&ItemKind::Ticket).unwrap(),
            "\"ticket\""
        );
        assert_eq!(
            serde_json::to_string(&WorkflowStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::from_str::<ItemKind>("\"task\"").unwrap(),
            ItemKind::Task
        );
        assert_eq!(
            serde_json::from_str::<WorkflowStatus>("\"review\"").unwrap(),
            WorkflowStatus::Review
        );
    }

    #[test]
    fn display_parse_roundtrips() {
        for kind in [ItemKind::Ticket, ItemKind::Task] {
            assert_eq!(ItemKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        for status in [
            WorkflowStatus::Backlog,
            WorkflowStatus::InProgress,
            WorkflowStatus::Review,
            WorkflowStatus::Done,
        ] {
            assert_eq!(
                WorkflowStatus::from_str(&status.to_string()).unwrap(),
                status
            );
        }
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert!(ItemKind::from_str("epic").is_err());
        assert!(WorkflowStatus::from_str("blocked").is_err());
    }

    #[test]
    fn resource_names() {
        assert_eq!(ItemKind::Ticket.resource(), "tickets");
        assert_eq!(ItemKind::Task.resource(), "tasks");
        assert_eq!(ItemKind::Ticket.noun(), "ticket");
    }

    #[test]
    fn workflow_transition_rules() {
        assert!(
            WorkflowStatus::Backlog
                .can_transition_to(WorkflowStatus::InProgress)
                .is_ok()
        );
        assert!(
            WorkflowStatus::InProgress
                .can_transition_to(WorkflowStatus::Review)
                .is_ok()
        );
        assert!(
            WorkflowStatus::Review
                .can_transition_to(WorkflowStatus::Done)
                .is_ok()
        );
        assert!(
            WorkflowStatus::Done
                .can_transition_to(WorkflowStatus::InProgress)
                .is_ok()
        );

        assert!(matches!(
            WorkflowStatus::Backlog.can_transition_to(WorkflowStatus::Done),
            Err(InvalidStatusTransition {
                from: WorkflowStatus::Backlog,
                to: WorkflowStatus::Done,
                ..
            })
        ));

        assert!(
            WorkflowStatus::Review
                .can_transition_to(WorkflowStatus::Review)
                .is_err()
        );
    }
}
