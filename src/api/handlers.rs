//! Application state, routing and the health endpoint.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::routing::{get, put};

use super::questions::update_question;
use crate::infrastructure::{QuestionRepository, Repositories, UserRepository};

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// Uses trait objects so the storage backend can be chosen at runtime by
/// the `RepositoryFactory`.
#[derive(Clone)]
pub struct AppState {
    /// Question store.
    pub question_repository: Arc<dyn QuestionRepository + Send + Sync>,
    /// User store, also the principal resolver's backing lookup.
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl AppState {
    /// Creates a new `AppState` from initialized repositories.
    #[must_use]
    pub fn from_repositories(repositories: Repositories) -> Self {
        Self {
            question_repository: repositories.question_repository,
            user_repository: repositories.user_repository,
        }
    }
}

// =============================================================================
// Router
// =============================================================================

/// Builds the application router with all routes bound to `state`.
///
/// Middleware layers (tracing, CORS) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/questions/{id}", put(update_question).patch(update_question))
        .with_state(state)
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
///
/// # Response
///
/// - **200 OK**: `{ "status": "healthy", "version": "0.1.0" }`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
