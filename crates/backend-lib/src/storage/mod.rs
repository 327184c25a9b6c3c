// ============================
// worksphere-backend-lib/src/storage/mod.rs
// ============================
//! Storage abstraction with a SQLite implementation.
//!
//! Handlers only see the [`Storage`] trait. The concrete store is built once
//! at startup and handed to [`crate::AppState`].
use async_trait::async_trait;
use worksphere_common::{CurrentUser, Project, User, UserId, Workspace, WorkspaceId};
use crate::error::AppError;

mod schema;
mod sqlite;

pub use sqlite::SqliteStorage;

/// User row including the password hash, only used by login
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Fields of a user about to be inserted
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Fields of a workspace about to be inserted
#[derive(Debug, Clone)]
pub struct NewWorkspace<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub owner_id: UserId,
}

/// Trait for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert a user. Fails with [`AppError::EmailTaken`] on a duplicate email.
    async fn create_user(&self, user: NewUser<'_>) -> Result<User, AppError>;

    /// Look up a user and their password hash by email
    async fn find_user_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, AppError>;

    /// Look up the public identity of a user
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<CurrentUser>, AppError>;

    /// Insert a workspace. Fails with [`AppError::SlugConflict`] when the slug
    /// was taken since it was allocated.
    async fn create_workspace(&self, workspace: NewWorkspace<'_>) -> Result<Workspace, AppError>;

    async fn find_workspace_by_slug(&self, slug: &str) -> Result<Option<Workspace>, AppError>;

    async fn find_workspace_by_id(&self, id: WorkspaceId) -> Result<Option<Workspace>, AppError>;

    /// Whether a workspace other than `exclude` already uses `slug`
    async fn slug_exists(&self, slug: &str, exclude: Option<WorkspaceId>) -> Result<bool, AppError>;

    /// Workspaces owned by `owner_id`, newest first
    async fn list_workspaces_by_owner(&self, owner_id: UserId) -> Result<Vec<Workspace>, AppError>;

    /// Set name and slug in a single statement.
    /// Fails with [`AppError::SlugConflict`] like `create_workspace`.
    async fn update_workspace(
        &self,
        id: WorkspaceId,
        name: &str,
        slug: &str,
    ) -> Result<Workspace, AppError>;

    /// Delete a workspace and its projects. Returns whether a row was removed.
    async fn delete_workspace(&self, id: WorkspaceId) -> Result<bool, AppError>;

    async fn create_project(&self, name: &str, workspace_id: WorkspaceId) -> Result<Project, AppError>;

    async fn list_projects(&self, workspace_id: WorkspaceId) -> Result<Vec<Project>, AppError>;
}
