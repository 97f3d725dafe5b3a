//! trellis-core library.
//!
//! Domain model, SQLite store, workspace access control, and the batch
//! reorder service shared by the ticket and task endpoints.
//!
//! # Conventions
//!
//! - **Errors**: fallible operations return [`Result`] with the typed
//!   [`Error`] taxonomy; callers map variants to transport-level failures.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).

pub mod access;
pub mod db;
pub mod error;
pub mod model;
pub mod reorder;

pub use access::RequesterContext;
pub use error::{Error, Result};
