// ============================
// worksphere-backend-lib/src/router.rs
// ============================
//! HTTP routes.
use crate::handlers::{self, auth, projects, workspaces};
use crate::middleware::require_auth;
use crate::storage::Storage;
use crate::AppState;
use axum::{
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Create the API router
pub fn create_router<S: Storage + Clone + 'static>(state: Arc<AppState<S>>) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/api/auth/register", post(auth::register::<S>))
        .route("/api/auth/login", post(auth::login::<S>));

    // Both workspace paths share the `{workspace}` segment name: a slug on the
    // first, a numeric id on the second.
    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/workspaces",
            post(workspaces::create::<S>).get(workspaces::list::<S>),
        )
        .route(
            "/api/workspaces/{workspace}",
            get(workspaces::get::<S>)
                .put(workspaces::update::<S>)
                .delete(workspaces::delete::<S>),
        )
        .route("/api/workspaces/{workspace}/projects", get(projects::list::<S>))
        .route("/api/projects", post(projects::create::<S>))
        .route_layer(from_fn_with_state(state.clone(), require_auth::<S>));

    let timeout = state.settings.request_timeout();

    public
        .merge(protected)
        .layer(timeout_layer(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Requests running longer than `timeout` are dropped and answered with 408
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}
