// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers.
//!
//! Every handler turns its failures into [`AppError`]; nothing below this
//! module writes a response by hand.

pub mod auth;
pub mod projects;
pub mod workspaces;

use axum::{extract::rejection::JsonRejection, Json};
use worksphere_common::{UserId, Workspace};

use crate::error::AppError;

/// Unwrap a JSON body, reporting malformed input as a validation error
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Keep the workspace only if `user_id` owns it
pub(crate) fn owned_by(workspace: Option<Workspace>, user_id: UserId) -> Option<Workspace> {
    workspace.filter(|ws| ws.owner_id == user_id)
}

/// Banner served on `/`
pub async fn root() -> &'static str {
    "Work Sphere API is running"
}
