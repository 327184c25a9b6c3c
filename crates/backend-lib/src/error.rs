// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use worksphere_common::{ErrorBody, ErrorResponse};

/// Reasons the auth guard rejects a request. All of them are 401s.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization token missing")]
    MissingCredential,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UnknownUser,
}

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Email already exists")]
    EmailTaken,

    #[error("Slug already taken: {0}")]
    SlugConflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidCredentials | AppError::EmailTaken => {
                StatusCode::BAD_REQUEST
            },
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SlugConflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::Unauthorized(AuthError::MissingCredential) => "AUTH_001",
            AppError::Unauthorized(AuthError::InvalidToken) => "AUTH_002",
            AppError::Unauthorized(AuthError::UnknownUser) => "AUTH_003",
            AppError::InvalidCredentials => "AUTH_004",
            AppError::Forbidden(_) => "FORBIDDEN_001",
            AppError::NotFound(_) => "NF_001",
            AppError::EmailTaken => "CONFLICT_001",
            AppError::SlugConflict(_) => "CONFLICT_002",
            AppError::Internal(_) => "INT_001",
            AppError::Database(_) => "DB_001",
        }
    }

    /// Message shown to the caller. Internal failures never expose their details.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Unauthorized(reason) => reason.to_string(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::Forbidden(_) => "Not authorized".to_string(),
            AppError::NotFound(what) => format!("{what} not found"),
            AppError::EmailTaken => "Email already exists".to_string(),
            AppError::SlugConflict(_) => {
                "Could not allocate a unique slug, please retry".to_string()
            },
            AppError::Internal(_) | AppError::Database(_) => "Server error".to_string(),
        }
    }

    /// Whether the failure is the server's fault rather than the caller's
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_internal() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code().to_string(),
                message: self.public_message(),
            },
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{err:#}"))
    }
}
