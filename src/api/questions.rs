//! Question update endpoint.
//!
//! `PUT /questions/{id}` (and `PATCH`) rewords a question. One attempt moves
//! from pending to exactly one of three terminal outcomes:
//!
//! - **Forbidden**: the principal is not the author. Nothing is validated.
//! - **Invalid**: one or more rules failed. Every failure is reported.
//! - **Applied**: the text and `updated_at` are written, nothing else.
//!
//! The record is never written unless the attempt is applied.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use super::auth::AuthenticatedUser;
use super::dto::{DataResponse, QuestionResponse, UpdateQuestionRequest};
use super::error::ApiErrorResponse;
use super::handlers::AppState;
use super::validation::{ValidationFailure, validate_question_update};
use crate::domain::{
    FieldErrors, QUESTION_FIELD, Question, QuestionId, RuleViolation, Timestamp, User, authorize,
};
use crate::infrastructure::RepositoryError;

// =============================================================================
// Update Outcome
// =============================================================================

/// Why an update attempt was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateQuestionError {
    /// No question has the requested ID.
    #[error("Question {0} not found")]
    NotFound(QuestionId),
    /// The principal did not author the question.
    #[error("forbidden")]
    Forbidden,
    /// The body is not a JSON update payload.
    #[error("malformed request body: {message}")]
    MalformedBody {
        /// 400 for a syntax error, 422 for a well-formed body of the wrong shape.
        status: StatusCode,
        /// Decoder message.
        message: String,
    },
    /// The payload or the stored state broke one or more rules.
    #[error("validation failed")]
    Invalid(FieldErrors),
    /// The store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ValidationFailure> for UpdateQuestionError {
    fn from(failure: ValidationFailure) -> Self {
        match failure {
            ValidationFailure::Invalid(errors) => Self::Invalid(errors),
            ValidationFailure::Store(error) => Self::Repository(error),
        }
    }
}

impl From<UpdateQuestionError> for ApiErrorResponse {
    fn from(error: UpdateQuestionError) -> Self {
        match error {
            UpdateQuestionError::NotFound(id) => Self::not_found(format!("Question {id} not found")),
            UpdateQuestionError::Forbidden => Self::forbidden(),
            UpdateQuestionError::MalformedBody { status, message } => {
                Self::invalid_json(status, message)
            }
            UpdateQuestionError::Invalid(errors) => Self::validation_error(&errors),
            UpdateQuestionError::Repository(error) => Self::from(error),
        }
    }
}

// =============================================================================
// Update Pipeline
// =============================================================================

/// Applies the update in `body` to question `id` on behalf of `principal`.
///
/// Steps run in order: load, authorize, decode, validate, persist. The body
/// is decoded only after the author check, so a denied principal gets
/// `Forbidden` whatever they send and learns nothing about the record.
///
/// # Errors
///
/// - `UpdateQuestionError::NotFound` if the question does not exist.
/// - `UpdateQuestionError::Forbidden` if `principal` is not the author.
/// - `UpdateQuestionError::MalformedBody` if the body is not an update payload.
/// - `UpdateQuestionError::Invalid` with every violated rule.
/// - `UpdateQuestionError::Repository` if the store fails.
pub async fn apply_question_update(
    state: &AppState,
    principal: &User,
    id: &QuestionId,
    body: &[u8],
) -> Result<Question, UpdateQuestionError> {
    let current = load_editable_question(state, principal, id).await?;
    let request = decode_update_body(body)?;
    persist_question_update(state, &current, &request).await
}

async fn load_editable_question(
    state: &AppState,
    principal: &User,
    id: &QuestionId,
) -> Result<Question, UpdateQuestionError> {
    let current = state
        .question_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| UpdateQuestionError::NotFound(id.clone()))?;

    if authorize(principal, &current).is_allowed() {
        Ok(current)
    } else {
        Err(UpdateQuestionError::Forbidden)
    }
}

async fn persist_question_update(
    state: &AppState,
    current: &Question,
    request: &UpdateQuestionRequest,
) -> Result<Question, UpdateQuestionError> {
    let id = &current.id;
    let validated =
        validate_question_update(request, current, state.question_repository.as_ref()).await?;

    let now = Timestamp::now();

    match state
        .question_repository
        .update_text(id, validated.question(), &now)
        .await
    {
        Ok(updated) => Ok(updated),
        // Lost a race with a concurrent writer between validation and write.
        Err(RepositoryError::UniqueViolation(_)) => {
            let mut errors = FieldErrors::new();
            errors.push(QUESTION_FIELD, RuleViolation::AlreadyTaken);
            Err(UpdateQuestionError::Invalid(errors))
        }
        Err(RepositoryError::NotFound(_)) => Err(UpdateQuestionError::NotFound(id.clone())),
        Err(error) => Err(UpdateQuestionError::Repository(error)),
    }
}

/// Decodes an update body.
///
/// A body with no content is an empty payload, so it fails the required rule
/// rather than being reported as malformed.
///
/// # Errors
///
/// Returns `UpdateQuestionError::MalformedBody` if the body is not a JSON
/// object with an optional string `question`.
pub fn decode_update_body(body: &[u8]) -> Result<UpdateQuestionRequest, UpdateQuestionError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(UpdateQuestionRequest::default());
    }

    serde_json::from_slice(body).map_err(|error| {
        let status = if error.is_data() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::BAD_REQUEST
        };
        UpdateQuestionError::MalformedBody {
            status,
            message: format!("Failed to parse the request body as JSON: {error}"),
        }
    })
}

// =============================================================================
// PUT /questions/{id} Handler
// =============================================================================

/// Path parameters for question routes.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionPath {
    /// Question ID.
    pub id: Uuid,
}

/// Rewords a question.
///
/// # Request Body
///
/// ```json
/// { "question": "Updated question text?" }
/// ```
///
/// # Response
///
/// - **200 OK**: `{ "data": { ...question } }`
/// - **401 Unauthorized**: missing or unknown bearer token
/// - **403 Forbidden**: the caller is not the author
/// - **404 Not Found**: no such question
/// - **400 Bad Request**: body is not JSON
/// - **422 Unprocessable Entity**: rule violations keyed by field, or a
///   JSON body of the wrong shape
///
/// The body is read raw and decoded after the author check, so a
/// non-author is refused with 403 whatever they send.
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for every non-applied outcome.
pub async fn update_question(
    State(state): State<AppState>,
    Path(path): Path<QuestionPath>,
    AuthenticatedUser(principal): AuthenticatedUser,
    body: Bytes,
) -> Result<Json<DataResponse<QuestionResponse>>, ApiErrorResponse> {
    let question_id = QuestionId::from_uuid(path.id);

    match apply_question_update(&state, &principal, &question_id, &body).await {
        Ok(updated) => {
            tracing::info!(
                question_id = %question_id,
                user_id = %principal.id,
                "Question updated"
            );
            // Only the author gets this far, so the principal is the creator.
            let response = QuestionResponse::new(&updated, &principal);
            Ok(Json(DataResponse::new(response)))
        }
        Err(error) => {
            match &error {
                UpdateQuestionError::Forbidden => tracing::warn!(
                    question_id = %question_id,
                    user_id = %principal.id,
                    "Rejected update from non-author"
                ),
                UpdateQuestionError::Invalid(errors) => tracing::debug!(
                    question_id = %question_id,
                    ?errors,
                    "Rejected invalid question update"
                ),
                UpdateQuestionError::MalformedBody { message, .. } => tracing::debug!(
                    question_id = %question_id,
                    %message,
                    "Rejected malformed question update body"
                ),
                UpdateQuestionError::NotFound(_) | UpdateQuestionError::Repository(_) => {}
            }
            Err(ApiErrorResponse::from(error))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
