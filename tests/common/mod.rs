//! Common test helpers for integration tests.
//!
//! Builds an in-memory `AppState`, seeds users and questions, and drives the
//! router with `tower::ServiceExt::oneshot`.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use question_edit_api::api::{AppState, router};
use question_edit_api::domain::{Question, QuestionId, QuestionStatus, Timestamp, User, UserId};
use question_edit_api::infrastructure::Repositories;

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates a test `AppState` backed by empty in-memory repositories.
pub fn create_test_app_state() -> AppState {
    AppState::from_repositories(Repositories::in_memory())
}

// =============================================================================
// Seeding Helpers
// =============================================================================

/// Saves a user whose bearer token is `token`.
pub async fn create_and_save_user(state: &AppState, name: &str, token: &str) -> User {
    let user = User::new(UserId::generate(), name, token);
    state
        .user_repository
        .insert(&user)
        .await
        .expect("user should be saved");
    user
}

/// Saves a question authored by `author`, created a day ago.
pub async fn create_and_save_question(
    state: &AppState,
    author: &User,
    text: &str,
    status: QuestionStatus,
) -> Question {
    let yesterday = Timestamp::from_datetime(Utc::now() - Duration::days(1));
    let question = Question::new(QuestionId::generate(), text, author.id.clone(), yesterday)
        .with_status(status);
    state
        .question_repository
        .insert(&question)
        .await
        .expect("question should be saved");
    question
}

/// Loads the stored copy of question `id`.
pub async fn find_question(state: &AppState, id: &QuestionId) -> Question {
    state
        .question_repository
        .find_by_id(id)
        .await
        .expect("lookup should succeed")
        .expect("question should exist")
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Response status and decoded JSON body.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Sends `body` to `/questions/{id}` with `method`, optionally authenticated.
pub async fn send_question_request(
    state: &AppState,
    method: Method,
    id: &str,
    token: Option<&str>,
    body: &Value,
) -> TestResponse {
    send_raw_question_request(
        state,
        method,
        id,
        token,
        Some("application/json"),
        body.to_string(),
    )
    .await
}

/// Sends an arbitrary body, with an optional `Content-Type`, to `/questions/{id}`.
pub async fn send_raw_question_request(
    state: &AppState,
    method: Method,
    id: &str,
    token: Option<&str>,
    content_type: Option<&str>,
    body: impl Into<Body>,
) -> TestResponse {
    let mut builder = Request::builder()
        .method(method)
        .uri(format!("/questions/{id}"));
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(body.into()).expect("request should build");

    let response = router(state.clone())
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse { status, body }
}

/// Sends a `PUT /questions/{id}` as the holder of `token`.
pub async fn send_update(
    state: &AppState,
    id: &QuestionId,
    token: &str,
    body: &Value,
) -> TestResponse {
    send_question_request(state, Method::PUT, &id.to_string(), Some(token), body).await
}
