//! Shared helpers for unit tests.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use worksphere_common::{CurrentUser, Project, User, UserId, Workspace, WorkspaceId};

use crate::config::Settings;
use crate::error::AppError;
use crate::storage::{NewUser, NewWorkspace, SqliteStorage, Storage, UserCredentials};
use crate::AppState;

pub const TEST_SECRET: &str = "unit-test-secret-unit-test-secret";

/// Settings with a valid secret and a cheap scrypt cost
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.jwt_secret = TEST_SECRET.to_string();
    settings.auth.scrypt_log_n = 4;
    settings
}

/// App state over a fresh in-memory database
pub async fn test_state() -> Arc<AppState<SqliteStorage>> {
    let storage = SqliteStorage::in_memory().await.unwrap();
    Arc::new(AppState::new(storage, test_settings()).unwrap())
}

/// Storage whose slug pre-check reports "free" for the first `misses` calls,
/// reproducing a writer that lost the check-then-insert race.
#[derive(Clone)]
pub struct StaleSlugCheck<S> {
    inner: S,
    misses: Arc<AtomicUsize>,
}

impl<S> StaleSlugCheck<S> {
    pub fn new(inner: S, misses: usize) -> Self {
        Self {
            inner,
            misses: Arc::new(AtomicUsize::new(misses)),
        }
    }
}

#[async_trait]
impl<S: Storage> Storage for StaleSlugCheck<S> {
    async fn create_user(&self, user: NewUser<'_>) -> Result<User, AppError> {
        self.inner.create_user(user).await
    }

    async fn find_user_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, AppError> {
        self.inner.find_user_credentials_by_email(email).await
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<CurrentUser>, AppError> {
        self.inner.find_user_by_id(id).await
    }

    async fn create_workspace(&self, workspace: NewWorkspace<'_>) -> Result<Workspace, AppError> {
        self.inner.create_workspace(workspace).await
    }

    async fn find_workspace_by_slug(&self, slug: &str) -> Result<Option<Workspace>, AppError> {
        self.inner.find_workspace_by_slug(slug).await
    }

    async fn find_workspace_by_id(&self, id: WorkspaceId) -> Result<Option<Workspace>, AppError> {
        self.inner.find_workspace_by_id(id).await
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<WorkspaceId>) -> Result<bool, AppError> {
        let stale = self
            .misses
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if stale {
            return Ok(false);
        }
        self.inner.slug_exists(slug, exclude).await
    }

    async fn list_workspaces_by_owner(&self, owner_id: UserId) -> Result<Vec<Workspace>, AppError> {
        self.inner.list_workspaces_by_owner(owner_id).await
    }

    async fn update_workspace(
        &self,
        id: WorkspaceId,
        name: &str,
        slug: &str,
    ) -> Result<Workspace, AppError> {
        self.inner.update_workspace(id, name, slug).await
    }

    async fn delete_workspace(&self, id: WorkspaceId) -> Result<bool, AppError> {
        self.inner.delete_workspace(id).await
    }

    async fn create_project(&self, name: &str, workspace_id: WorkspaceId) -> Result<Project, AppError> {
        self.inner.create_project(name, workspace_id).await
    }

    async fn list_projects(&self, workspace_id: WorkspaceId) -> Result<Vec<Project>, AppError> {
        self.inner.list_projects(workspace_id).await
    }
}
