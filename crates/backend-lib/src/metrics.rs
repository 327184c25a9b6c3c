// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const USER_REGISTERED: &str = "auth.register";
pub const LOGIN_SUCCEEDED: &str = "auth.login.ok";
pub const LOGIN_FAILED: &str = "auth.login.failed";
pub const AUTH_REJECTED: &str = "auth.rejected";
pub const WORKSPACE_CREATED: &str = "workspace.created";
pub const WORKSPACE_UPDATED: &str = "workspace.updated";
pub const WORKSPACE_DELETED: &str = "workspace.deleted";
pub const SLUG_COLLISION: &str = "slug.collision";
pub const SLUG_CONFLICT_RETRY: &str = "slug.conflict_retry";
pub const PROJECT_CREATED: &str = "project.created";
