// ============================
// crates/backend-lib/src/handlers/workspaces.rs
// ============================
//! Workspace CRUD.
//!
//! Lookups by slug answer 404 both when the workspace does not exist and when
//! it belongs to someone else, so callers cannot probe for other tenants'
//! slugs.
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    Json,
};
use metrics::counter;
use tracing::info;
use worksphere_common::{CurrentUser, MessageResponse, UserId, Workspace, WorkspaceRequest};

use super::{json_body, owned_by};
use crate::error::AppError;
use crate::metrics::{WORKSPACE_CREATED, WORKSPACE_DELETED, WORKSPACE_UPDATED};
use crate::slug::with_allocated_slug;
use crate::storage::{NewWorkspace, Storage};
use crate::validation::validate_workspace;
use crate::AppState;

async fn owned_workspace<S: Storage>(
    storage: &S,
    slug: &str,
    user_id: UserId,
) -> Result<Workspace, AppError> {
    owned_by(storage.find_workspace_by_slug(slug).await?, user_id)
        .ok_or_else(|| AppError::NotFound("Workspace".to_string()))
}

/// `POST /api/workspaces`
pub async fn create<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<WorkspaceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Workspace>), AppError> {
    let name = validate_workspace(json_body(payload)?)?;
    let storage = &state.storage;
    let owner_id = user.id;

    let workspace = with_allocated_slug(storage, &name, None, |slug| {
        let name = name.as_str();
        async move {
            storage
                .create_workspace(NewWorkspace { name, slug: &slug, owner_id })
                .await
        }
    })
    .await?;

    info!(workspace_id = workspace.id, slug = %workspace.slug, owner_id = user.id, "workspace created");
    counter!(WORKSPACE_CREATED).increment(1);

    Ok((StatusCode::CREATED, Json(workspace)))
}

/// `GET /api/workspaces`
pub async fn list<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Workspace>>, AppError> {
    let workspaces = state.storage.list_workspaces_by_owner(user.id).await?;
    Ok(Json(workspaces))
}

/// `GET /api/workspaces/{slug}`
pub async fn get<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<CurrentUser>,
    Path(slug): Path<String>,
) -> Result<Json<Workspace>, AppError> {
    let workspace = owned_workspace(&state.storage, &slug, user.id).await?;
    Ok(Json(workspace))
}

/// `PUT /api/workspaces/{slug}`: rename, regenerating the slug
pub async fn update<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<CurrentUser>,
    Path(slug): Path<String>,
    payload: Result<Json<WorkspaceRequest>, JsonRejection>,
) -> Result<Json<Workspace>, AppError> {
    let name = validate_workspace(json_body(payload)?)?;
    let storage = &state.storage;
    let existing = owned_workspace(storage, &slug, user.id).await?;

    // The workspace's own slug is excluded, so keeping the name keeps the slug.
    let id = existing.id;
    let workspace = with_allocated_slug(storage, &name, Some(id), |new_slug| {
        let name = name.as_str();
        async move { storage.update_workspace(id, name, &new_slug).await }
    })
    .await?;

    info!(
        workspace_id = workspace.id,
        old_slug = %existing.slug,
        slug = %workspace.slug,
        "workspace updated"
    );
    counter!(WORKSPACE_UPDATED).increment(1);

    Ok(Json(workspace))
}

/// `DELETE /api/workspaces/{slug}`
pub async fn delete<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<CurrentUser>,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let workspace = owned_workspace(&state.storage, &slug, user.id).await?;

    if !state.storage.delete_workspace(workspace.id).await? {
        // removed by a concurrent request in between
        return Err(AppError::NotFound("Workspace".to_string()));
    }

    info!(workspace_id = workspace.id, slug = %workspace.slug, "workspace deleted");
    counter!(WORKSPACE_DELETED).increment(1);

    Ok(Json(MessageResponse::new("Workspace deleted")))
}
