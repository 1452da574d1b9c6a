//! Principal resolution for authenticated routes.
//!
//! Requests carry `Authorization: Bearer <token>`; the token is looked up in
//! the user store. Anything else is rejected with 401 before a handler runs.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::ApiErrorResponse;
use super::handlers::AppState;
use crate::domain::User;

/// The user the current request acts as.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Extracts the token from a `Bearer` authorization header value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(ApiErrorResponse::unauthenticated)?;

        let user = state
            .user_repository
            .find_by_api_token(token)
            .await
            .map_err(ApiErrorResponse::from)?;

        user.map(Self).ok_or_else(|| {
            tracing::debug!("Rejected unknown bearer token");
            ApiErrorResponse::unauthenticated()
        })
    }
}
