//! API module for HTTP handlers.
//!
//! This module contains route definitions, request/response handlers,
//! principal resolution and the question update validation.

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod questions;
pub mod validation;

pub use auth::AuthenticatedUser;
pub use dto::{CreatorResponse, DataResponse, QuestionResponse, UpdateQuestionRequest};
pub use error::{ApiError, ApiErrorResponse};
pub use handlers::{AppState, HealthResponse, health_check, router};
pub use questions::{UpdateQuestionError, apply_question_update, update_question};
pub use validation::{ValidatedQuestionUpdate, ValidationFailure, validate_question_update};
