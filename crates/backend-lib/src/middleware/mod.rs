// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the `WorkSphere` API server.

pub mod auth;

pub use auth::{authenticate, bearer_token, require_auth, BEARER_PREFIX};
