//! Bearer token gate in front of every protected route.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use tracing::{debug, warn};
use worksphere_common::CurrentUser;

use crate::auth::AuthService;
use crate::error::{AppError, AuthError};
use crate::metrics::AUTH_REJECTED;
use crate::storage::Storage;
use crate::AppState;

/// Required verbatim at the start of the `Authorization` header
pub const BEARER_PREFIX: &str = "Bearer ";

/// Extract the raw token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or(AuthError::MissingCredential)
}

/// Resolve the identity behind a request.
///
/// Runs a fresh store lookup every time, so a token whose user has been
/// removed stops working even though its signature is still valid.
pub async fn authenticate<S>(
    headers: &HeaderMap,
    auth: &dyn AuthService,
    storage: &S,
) -> Result<CurrentUser, AppError>
where
    S: Storage + ?Sized,
{
    let token = bearer_token(headers)?;

    let user_id = auth.verify_token(token).map_err(|e| {
        debug!(error = %e, "token verification failed");
        AuthError::InvalidToken
    })?;

    storage
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::Unauthorized(AuthError::UnknownUser))
}

/// Auth middleware: attaches [`CurrentUser`] to the request extensions or
/// answers 401.
pub async fn require_auth<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match authenticate(request.headers(), state.auth.as_ref(), &state.storage).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        },
        Err(err) => {
            if let AppError::Unauthorized(reason) = &err {
                warn!(%reason, path = %request.uri().path(), "request rejected");
                counter!(AUTH_REJECTED).increment(1);
            }
            Err(err)
        },
    }
}
