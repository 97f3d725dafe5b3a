//! trellis-api library.
//!
//! HTTP surface for trellis: router, handlers, requester-context
//! extraction, and error-to-status mapping. The `trellisd` binary wires
//! this up to a TCP listener.

pub mod config;
pub mod context;
pub mod error;
pub mod response;
pub mod routes;
pub mod state;
