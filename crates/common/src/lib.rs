// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between `WorkSphere` API clients and the server.
//! This module defines the JSON bodies of every endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a user row
pub type UserId = i64;
/// Identifier of a workspace row
pub type WorkspaceId = i64;
/// Identifier of a project row
pub type ProjectId = i64;

/// A registered user as returned to clients.
/// The password hash never appears in this type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// The identity attached to an authenticated request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// A workspace owned by a single user
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    /// URL-safe identifier, unique across all workspaces
    pub slug: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A project inside a workspace
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub workspace_id: WorkspaceId,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/auth/register`.
/// Fields are optional so that missing ones surface as validation errors
/// instead of deserialization failures.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /api/auth/login`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Returned by register and login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Returned by `GET /api/auth/me`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MeResponse {
    pub user: CurrentUser,
}

/// Body of workspace create and rename
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct WorkspaceRequest {
    pub name: Option<String>,
}

/// Body of `POST /api/projects`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub workspace_id: Option<WorkspaceId>,
}

/// Plain acknowledgement body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error envelope rendered by the server for every failed request
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error code and human readable message
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
