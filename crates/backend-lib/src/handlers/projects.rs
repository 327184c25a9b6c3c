// ============================
// crates/backend-lib/src/handlers/projects.rs
// ============================
//! Projects inside a workspace.
//!
//! Unlike the workspace endpoints, a workspace that is missing or owned by
//! someone else is reported as 403 here.
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};
use metrics::counter;
use tracing::info;
use worksphere_common::{CreateProjectRequest, CurrentUser, Project, UserId, Workspace, WorkspaceId};

use super::{json_body, owned_by};
use crate::error::AppError;
use crate::metrics::PROJECT_CREATED;
use crate::storage::Storage;
use crate::validation::validate_project;
use crate::AppState;

async fn owned_workspace<S: Storage>(
    storage: &S,
    workspace_id: WorkspaceId,
    user_id: UserId,
) -> Result<Workspace, AppError> {
    owned_by(storage.find_workspace_by_id(workspace_id).await?, user_id)
        .ok_or_else(|| AppError::Forbidden(format!("workspace {workspace_id}")))
}

/// `POST /api/projects`
pub async fn create<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<Json<Project>, AppError> {
    let new_project = validate_project(json_body(payload)?)?;
    let workspace = owned_workspace(&state.storage, new_project.workspace_id, user.id).await?;

    let project = state
        .storage
        .create_project(&new_project.name, workspace.id)
        .await?;

    info!(project_id = project.id, workspace_id = workspace.id, "project created");
    counter!(PROJECT_CREATED).increment(1);

    Ok(Json(project))
}

/// `GET /api/workspaces/{workspace_id}/projects`
pub async fn list<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<CurrentUser>,
    Path(workspace_id): Path<String>,
) -> Result<Json<Vec<Project>>, AppError> {
    let workspace_id: WorkspaceId = workspace_id
        .parse()
        .map_err(|_| AppError::Validation("workspaceId must be a number".to_string()))?;
    let workspace = owned_workspace(&state.storage, workspace_id, user.id).await?;

    let projects = state.storage.list_projects(workspace.id).await?;
    Ok(Json(projects))
}
