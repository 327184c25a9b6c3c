// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request body validation.
//!
//! Every function takes the raw, all-optional request body and returns a
//! struct whose fields are present and normalized, or a [`ValidationError`].

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use worksphere_common::{CreateProjectRequest, LoginRequest, RegisterRequest, WorkspaceId, WorkspaceRequest};

use crate::error::AppError;

const MAX_NAME_LENGTH: usize = 100;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub workspace_id: WorkspaceId,
}

/// Present and not only whitespace
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Emails compare case-insensitively
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a display name for a user, workspace or project
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "Name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email address cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email address format".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a new password
pub fn validate_password(password: &str, min_length: usize) -> ValidationResult<&str> {
    let length = password.chars().count();
    if length < min_length {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {min_length} characters"
        )));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password cannot exceed {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(password)
}

pub fn validate_registration(
    req: RegisterRequest,
    password_min_length: usize,
) -> ValidationResult<Registration> {
    let (Some(name), Some(email), Some(password)) =
        (present(req.name), present(req.email), present(req.password))
    else {
        return Err(ValidationError::MissingFields(
            "Name, email, and password are required",
        ));
    };

    let name = validate_name(&name)?;
    let email = normalize_email(&email);
    validate_email(&email)?;
    validate_password(&password, password_min_length)?;

    Ok(Registration { name, email, password })
}

/// Login only checks presence; wrong values are reported as bad credentials.
pub fn validate_login(req: LoginRequest) -> ValidationResult<Login> {
    let (Some(email), Some(password)) = (present(req.email), present(req.password)) else {
        return Err(ValidationError::MissingFields("Email and password are required"));
    };

    Ok(Login {
        email: normalize_email(&email),
        password,
    })
}

pub fn validate_workspace(req: WorkspaceRequest) -> ValidationResult<String> {
    let name = present(req.name).ok_or(ValidationError::MissingFields("Name is required"))?;
    validate_name(&name)
}

pub fn validate_project(req: CreateProjectRequest) -> ValidationResult<NewProject> {
    let (Some(name), Some(workspace_id)) = (present(req.name), req.workspace_id) else {
        return Err(ValidationError::MissingFields(
            "Name and workspaceId are required",
        ));
    };

    Ok(NewProject {
        name: validate_name(&name)?,
        workspace_id,
    })
}
