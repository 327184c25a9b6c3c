// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Registration, login and identity handlers.
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use metrics::counter;
use tracing::info;
use worksphere_common::{AuthResponse, CurrentUser, LoginRequest, MeResponse, RegisterRequest};

use super::json_body;
use crate::error::AppError;
use crate::metrics::{LOGIN_FAILED, LOGIN_SUCCEEDED, USER_REGISTERED};
use crate::storage::{NewUser, Storage};
use crate::validation::{validate_login, validate_registration};
use crate::AppState;

/// `POST /api/auth/register`
pub async fn register<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let registration = validate_registration(
        json_body(payload)?,
        state.settings.auth.password_min_length,
    )?;

    // Saves a hash computation for the common case; the unique index on
    // email still rejects a concurrent duplicate in `create_user`.
    if state
        .storage
        .find_user_credentials_by_email(&registration.email)
        .await?
        .is_some()
    {
        return Err(AppError::EmailTaken);
    }

    let password_hash = state.auth.hash_password(&registration.password).await?;
    let user = state
        .storage
        .create_user(NewUser {
            name: &registration.name,
            email: &registration.email,
            password_hash: &password_hash,
        })
        .await?;

    let token = state.auth.issue_token(user.id).map_err(AppError::internal)?;

    info!(user_id = user.id, "user registered");
    counter!(USER_REGISTERED).increment(1);

    Ok(Json(AuthResponse { token, user }))
}

/// `POST /api/auth/login`
///
/// Unknown email and wrong password produce the same error.
pub async fn login<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let login = validate_login(json_body(payload)?)?;

    let credentials = state
        .storage
        .find_user_credentials_by_email(&login.email)
        .await?;

    // An unknown email still pays for one scrypt verification
    let hash = credentials
        .as_ref()
        .map_or(state.auth.dummy_hash(), |c| c.password_hash.as_str());
    let verified = state.auth.verify_password(hash, &login.password).await?;

    let Some(credentials) = credentials.filter(|_| verified) else {
        counter!(LOGIN_FAILED).increment(1);
        return Err(AppError::InvalidCredentials);
    };

    let user = credentials.user;
    let token = state.auth.issue_token(user.id).map_err(AppError::internal)?;

    info!(user_id = user.id, "user logged in");
    counter!(LOGIN_SUCCEEDED).increment(1);

    Ok(Json(AuthResponse { token, user }))
}

/// `GET /api/auth/me`
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<MeResponse> {
    Json(MeResponse { user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthService, TokenError};
    use crate::storage::SqliteStorage;
    use crate::test_support::test_settings;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use worksphere_common::UserId;

    const DUMMY: &str = "$scrypt$dummy";

    /// Auth service recording which hashes login verified against
    struct RecordingAuth {
        verified_hashes: Mutex<Vec<String>>,
        verify_calls: AtomicUsize,
        verify_fails: bool,
    }

    impl RecordingAuth {
        fn new(verify_fails: bool) -> Self {
            Self { verified_hashes: Mutex::new(Vec::new()), verify_calls: AtomicUsize::new(0), verify_fails }
        }
    }

    #[async_trait]
    impl AuthService for RecordingAuth {
        async fn hash_password(&self, plain: &str) -> anyhow::Result<String> {
            Ok(format!("plain:{plain}"))
        }

        async fn verify_password(&self, hash: &str, plain: &str) -> anyhow::Result<bool> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            self.verified_hashes.lock().unwrap().push(hash.to_string());
            if self.verify_fails {
                anyhow::bail!("verification task cancelled");
            }
            Ok(hash == format!("plain:{plain}"))
        }

        fn dummy_hash(&self) -> &str {
            DUMMY
        }

        fn issue_token(&self, user_id: UserId) -> Result<String, TokenError> {
            Ok(format!("token-{user_id}"))
        }

        fn verify_token(&self, _token: &str) -> Result<UserId, TokenError> {
            Err(TokenError::Expired(0))
        }
    }

    async fn state_with(auth: Arc<RecordingAuth>) -> Arc<AppState<SqliteStorage>> {
        let storage = SqliteStorage::in_memory().await.unwrap();
        storage
            .create_user(NewUser { name: "Ada", email: "ada@example.com", password_hash: "plain:correct-horse" })
            .await
            .unwrap();
        Arc::new(AppState::with_auth(storage, test_settings(), auth))
    }

    fn login_body(email: &str, password: &str) -> Result<Json<LoginRequest>, JsonRejection> {
        Ok(Json(LoginRequest { email: Some(email.to_string()), password: Some(password.to_string()) }))
    }

    #[tokio::test]
    async fn test_unknown_email_still_runs_one_verification() {
        let auth = Arc::new(RecordingAuth::new(false));
        let state = state_with(auth.clone()).await;

        let err = login(State(state.clone()), login_body("nobody@example.com", "guess"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert_eq!(auth.verify_calls.load(Ordering::SeqCst), 1);
        assert_eq!(auth.verified_hashes.lock().unwrap().as_slice(), [DUMMY]);

        let err = login(State(state), login_body("ada@example.com", "guess"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert_eq!(auth.verify_calls.load(Ordering::SeqCst), 2);
        assert_eq!(auth.verified_hashes.lock().unwrap()[1], "plain:correct-horse");
    }

    #[tokio::test]
    async fn test_correct_password_logs_in() {
        let state = state_with(Arc::new(RecordingAuth::new(false))).await;
        let Json(response) = login(State(state), login_body("ada@example.com", "correct-horse"))
            .await
            .unwrap();
        assert_eq!(response.user.email, "ada@example.com");
        assert_eq!(response.token, format!("token-{}", response.user.id));
    }

    #[tokio::test]
    async fn test_failed_verification_is_a_server_error() {
        let state = state_with(Arc::new(RecordingAuth::new(true))).await;
        let err = login(State(state), login_body("ada@example.com", "correct-horse"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
