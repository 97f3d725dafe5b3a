//! Error taxonomy shared across the store, access control, and services.
//!
//! Variants map one-to-one onto the failure classes the HTTP surface
//! reports: validation (400), authentication (401), authorization (403),
//! not-found (404), conflict (409), and storage failures (500).

use thiserror::Error;

/// Convenience alias used throughout trellis-core.
pub type Result<T> = std::result::Result<T, Error>;

/// All failure classes produced by the core.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or empty request payload. Recoverable by resubmitting
    /// corrected input; never mutates state.
    #[error("{0}")]
    Validation(String),

    /// No verifiable caller identity.
    #[error("Authentication required")]
    Authentication,

    /// Identity verified but lacks workspace membership.
    #[error("Access denied")]
    Authorization,

    /// Referenced entity does not exist or is soft-deleted.
    #[error("{0} not found")]
    NotFound(String),

    /// Valid entities, invalid state change (e.g. a disallowed status
    /// transition).
    #[error("{0}")]
    Conflict(String),

    /// The backing store failed. Surfaced generically; retry policy, if
    /// any, belongs to the caller.
    #[error("storage failure: {0}")]
    Store(#[from] rusqlite::Error),
}

impl Error {
    /// Build a validation error from any displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Build a not-found error; `what` names the missing entity
    /// (e.g. `"ticket wi-abc"`).
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Build a conflict error from any displayable message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}
