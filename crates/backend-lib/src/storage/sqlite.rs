//! SQLite implementation of [`Storage`] on top of a sqlx pool.
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::info;
use worksphere_common::{CurrentUser, Project, User, UserId, Workspace, WorkspaceId};

use super::{schema, NewUser, NewWorkspace, Storage, UserCredentials};
use crate::error::AppError;

const WORKSPACE_COLUMNS: &str = "id, name, slug, owner_id, created_at";
const PROJECT_COLUMNS: &str = "id, name, workspace_id, created_at";

#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserCredentials {
    fn from(row: UserRow) -> Self {
        UserCredentials {
            user: User {
                id: row.id,
                name: row.name,
                email: row.email,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        }
    }
}

#[derive(FromRow)]
struct IdentityRow {
    id: i64,
    name: String,
    email: String,
}

#[derive(FromRow)]
struct WorkspaceRow {
    id: i64,
    name: String,
    slug: String,
    owner_id: i64,
    created_at: DateTime<Utc>,
}

impl From<WorkspaceRow> for Workspace {
    fn from(row: WorkspaceRow) -> Self {
        Workspace {
            id: row.id,
            name: row.name,
            slug: row.slug,
            owner_id: row.owner_id,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ProjectRow {
    id: i64,
    name: String,
    workspace_id: i64,
    created_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            name: row.name,
            workspace_id: row.workspace_id,
            created_at: row.created_at,
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

/// Relational store backed by SQLite
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Connect to the database at `url` and make sure the schema exists.
    ///
    /// `url` is a sqlx SQLite URL such as `sqlite://worksphere.db` or
    /// `sqlite::memory:`.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let is_in_memory = url.contains(":memory:") || url.contains("mode=memory");

        // An in-memory database lives as long as its last connection, so the
        // pool keeps exactly one open forever.
        let pool = if is_in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options.journal_mode(SqliteJournalMode::Wal))
                .await?
        };

        schema::initialize(&pool).await?;
        info!(url, "connected to database");

        Ok(Self { pool })
    }

    /// A private in-memory database, used by tests
    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_user(&self, user: NewUser<'_>) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (name, email, password_hash, created_at) VALUES (?, ?, ?, ?)
             RETURNING id, name, email, password_hash, created_at",
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::EmailTaken
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(UserCredentials::from(row).user)
    }

    async fn find_user_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserCredentials::from))
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<CurrentUser>, AppError> {
        let row = sqlx::query_as::<_, IdentityRow>("SELECT id, name, email FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| CurrentUser {
            id: r.id,
            name: r.name,
            email: r.email,
        }))
    }

    async fn create_workspace(&self, workspace: NewWorkspace<'_>) -> Result<Workspace, AppError> {
        let sql = format!(
            "INSERT INTO workspaces (name, slug, owner_id, created_at) VALUES (?, ?, ?, ?)
             RETURNING {WORKSPACE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, WorkspaceRow>(&sql)
            .bind(workspace.name)
            .bind(workspace.slug)
            .bind(workspace.owner_id)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::SlugConflict(workspace.slug.to_string())
                } else {
                    AppError::Database(e)
                }
            })?;

        Ok(row.into())
    }

    async fn find_workspace_by_slug(&self, slug: &str) -> Result<Option<Workspace>, AppError> {
        let sql = format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE slug = ?");
        let row = sqlx::query_as::<_, WorkspaceRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Workspace::from))
    }

    async fn find_workspace_by_id(&self, id: WorkspaceId) -> Result<Option<Workspace>, AppError> {
        let sql = format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE id = ?");
        let row = sqlx::query_as::<_, WorkspaceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Workspace::from))
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<WorkspaceId>) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM workspaces WHERE slug = ? AND (? IS NULL OR id != ?) LIMIT 1",
        )
        .bind(slug)
        .bind(exclude)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    async fn list_workspaces_by_owner(&self, owner_id: UserId) -> Result<Vec<Workspace>, AppError> {
        let sql = format!(
            "SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE owner_id = ?
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, WorkspaceRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Workspace::from).collect())
    }

    async fn update_workspace(
        &self,
        id: WorkspaceId,
        name: &str,
        slug: &str,
    ) -> Result<Workspace, AppError> {
        let sql = format!(
            "UPDATE workspaces SET name = ?, slug = ? WHERE id = ? RETURNING {WORKSPACE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, WorkspaceRow>(&sql)
            .bind(name)
            .bind(slug)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::SlugConflict(slug.to_string())
                } else {
                    AppError::Database(e)
                }
            })?;

        row.map(Workspace::from)
            .ok_or_else(|| AppError::NotFound("Workspace".to_string()))
    }

    async fn delete_workspace(&self, id: WorkspaceId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM workspaces WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_project(&self, name: &str, workspace_id: WorkspaceId) -> Result<Project, AppError> {
        let sql = format!(
            "INSERT INTO projects (name, workspace_id, created_at) VALUES (?, ?, ?)
             RETURNING {PROJECT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(name)
            .bind(workspace_id)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn list_projects(&self, workspace_id: WorkspaceId) -> Result<Vec<Project>, AppError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE workspace_id = ? ORDER BY id");
        let rows = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(workspace_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Project::from).collect())
    }
}
