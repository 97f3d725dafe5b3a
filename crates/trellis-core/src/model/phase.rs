//! Phase records: the optional grouping of work items inside a feature.

use super::{ParseEnumError, normalize};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Phase lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Pending,
    Active,
    Complete,
}

impl PhaseStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Complete => "complete",
        }
    }

    /// Validate whether a transition from self to `target` is allowed.
    ///
    /// Valid transitions:
    /// - `pending -> active`
    /// - `active -> complete`
    /// - `active -> pending` (reopen)
    /// - `complete -> active` (reopen)
    pub fn can_transition_to(self, target: Self) -> Result<(), InvalidPhaseTransition> {
        if self == target {
            return Err(InvalidPhaseTransition {
                from: self,
                to: target,
                reason: "no-op transition is not allowed",
            });
        }

        let allowed = matches!(
            (self, target),
            (Self::Pending, Self::Active)
                | (Self::Active, Self::Complete)
                | (Self::Active, Self::Pending)
                | (Self::Complete, Self::Active)
        );

        if allowed {
            Ok(())
        } else {
            Err(InvalidPhaseTransition {
                from: self,
                to: target,
                reason: "transition not allowed by lifecycle rules",
            })
        }
    }
}

/// Error returned when a phase status transition is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPhaseTransition {
    pub from: PhaseStatus,
    pub to: PhaseStatus,
    pub reason: &'static str,
}

impl fmt::Display for InvalidPhaseTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid phase transition {} -> {}: {}",
            self.from, self.to, self.reason
        )
    }
}

impl std::error::Error for InvalidPhaseTransition {}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "complete" => Ok(Self::Complete),
            _ => Err(ParseEnumError {
                expected: "phase status",
                got: s.to_string(),
            }),
        }
    }
}

/// A phase row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: String,
    pub feature_id: String,
    pub name: String,
    pub status: PhaseStatus,
    pub is_deleted: bool,
    pub deleted_at_us: Option<i64>,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

#[cfg(test)]
mod tests {
    use super::{InvalidPhaseTransition, PhaseStatus};
    use std::str::FromStr;

    #[test]
    fn display_parse_roundtrips() {
        for status in [
            PhaseStatus::Pending,
            PhaseStatus::Active,
            PhaseStatus::Complete,
        ] {
            let rendered = status.to_string();
            assert_eq!(PhaseStatus::from_str(&rendered).unwrap(), status);
        }
    }

    #[test]
    fn transition_rules() {
        assert!(
            PhaseStatus::Pending
                .can_transition_to(PhaseStatus::Active)
                .is_ok()
        );
        assert!(
            PhaseStatus::Active
                .can_transition_to(PhaseStatus::Complete)
                .is_ok()
        );
        assert!(
            PhaseStatus::Active
                .can_transition_to(PhaseStatus::Pending)
                .is_ok()
        );
        assert!(
            PhaseStatus::Complete
                .can_transition_to(PhaseStatus::Active)
                .is_ok()
        );

        assert!(matches!(
            PhaseStatus::Pending.can_transition_to(PhaseStatus::Complete),
            Err(InvalidPhaseTransition {
                from: PhaseStatus::Pending,
                to: PhaseStatus::Complete,
                ..
            })
        ));

        assert!(
            PhaseStatus::Active
                .can_transition_to(PhaseStatus::Active)
                .is_err()
        );
    }
}
