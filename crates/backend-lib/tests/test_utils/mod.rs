//! Test utilities for the API integration tests
//!
//! Every test gets its own router over a private in-memory database, so tests
//! can run in parallel without sharing rows.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use backend_lib::{config::Settings, create_router, storage::SqliteStorage, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789";
pub const PASSWORD: &str = "correct-horse";

/// A router plus the state behind it
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState<SqliteStorage>>,
}

/// Settings with a valid secret and a cheap scrypt cost
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.jwt_secret = TEST_SECRET.to_string();
    settings.auth.scrypt_log_n = 4;
    settings
}

pub async fn setup_test_app() -> TestApp {
    let storage = SqliteStorage::in_memory()
        .await
        .expect("Failed to open in-memory database");
    let state = Arc::new(
        AppState::new(storage, test_settings()).expect("Failed to create AppState for test"),
    );
    let router = create_router(state.clone());
    TestApp { router, state }
}

impl TestApp {
    /// Send a request and return the status with the decoded body.
    ///
    /// JSON bodies are parsed, any other non-empty body comes back as a
    /// string and an empty body as `null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_raw(request).await
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Register a user and return `(token, user)`
    pub async fn register(&self, name: &str, email: &str) -> (String, Value) {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({ "name": name, "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        let token = body["token"].as_str().unwrap().to_string();
        (token, body["user"].clone())
    }

    /// Create a workspace and return its JSON
    pub async fn create_workspace(&self, token: &str, name: &str) -> Value {
        let (status, body) = self
            .post("/api/workspaces", Some(token), json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create workspace failed: {body}");
        body
    }

    /// Number of user rows in the database
    pub async fn user_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.state.storage.pool())
            .await
            .unwrap()
    }
}

/// The `error.message` of an error body
pub fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}
