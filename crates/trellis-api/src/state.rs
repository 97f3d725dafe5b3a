//! Shared application state.
//!
//! The store owns one SQLite connection, so handlers serialize on a
//! mutex. Reorder takes `&mut Store` for its transaction; the lock hands
//! out exactly that. No await points occur while the lock is held.

use parking_lot::Mutex;
use std::sync::Arc;
use trellis_core::db::Store;

pub struct AppState {
    pub store: Mutex<Store>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wrap a store for use as axum state.
    #[must_use]
    pub fn shared(store: Store) -> SharedState {
        Arc::new(Self {
            store: Mutex::new(store),
        })
    }
}
