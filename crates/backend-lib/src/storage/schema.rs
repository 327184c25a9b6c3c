//! SQL schema definitions.
//!
//! Applied on every connect; all statements are idempotent.

use sqlx::SqlitePool;

/// SQL statements to create the schema tables.
pub const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS workspaces (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        slug TEXT NOT NULL,
        owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL
    )",
    // Deleting a workspace removes its projects
    "CREATE TABLE IF NOT EXISTS projects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        workspace_id INTEGER NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL
    )",
];

/// SQL statements to create indexes.
/// The two unique indexes are the authoritative uniqueness guarantees.
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_workspaces_slug ON workspaces(slug)",
    "CREATE INDEX IF NOT EXISTS idx_workspaces_owner ON workspaces(owner_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_projects_workspace ON projects(workspace_id)",
];

/// Initialize the database schema.
pub async fn initialize(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in CREATE_TABLES.iter().chain(CREATE_INDEXES) {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
