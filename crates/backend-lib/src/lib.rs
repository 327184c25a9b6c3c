// ============================
// worksphere-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the `WorkSphere` API server.

pub mod config;
pub mod storage;
pub mod auth;
pub mod slug;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod validation;
pub mod handlers;
pub mod router;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use crate::auth::{AuthService, DefaultAuth};
use crate::config::Settings;
use crate::storage::Storage;

pub use crate::router::create_router;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Password hashing and token service
    pub auth: Arc<dyn AuthService>,
    /// Settings loaded at startup
    pub settings: Arc<Settings>,
    /// Storage backend
    pub storage: S,
}

impl<S: Storage> AppState<S> {
    /// Create a new application state. Token keys are derived from the
    /// configured secret here, once per process.
    pub fn new(storage: S, settings: Settings) -> anyhow::Result<Self> {
        let auth = Arc::new(DefaultAuth::from_settings(&settings.auth)?);
        Ok(Self::with_auth(storage, settings, auth))
    }

    /// Create a state around an existing auth service
    pub fn with_auth(storage: S, settings: Settings, auth: Arc<dyn AuthService>) -> Self {
        Self {
            auth,
            settings: Arc::new(settings),
            storage,
        }
    }
}
