//! Data Transfer Objects for API requests and responses.
//!
//! This module contains DTOs that are separate from domain models,
//! providing a clean API contract.

use serde::{Deserialize, Serialize};

use crate::domain::{Question, QuestionStatus, User};

// =============================================================================
// Question DTOs
// =============================================================================

/// Request DTO for updating a question.
///
/// Only the text is accepted; any other field in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuestionRequest {
    /// New question text.
    #[serde(default)]
    pub question: Option<String>,
}

#[cfg(test)]
impl UpdateQuestionRequest {
    /// Creates a request carrying `question`.
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
        }
    }
}

/// Envelope wrapping every successful resource response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    /// The resource.
    pub data: T,
}

impl<T> DataResponse<T> {
    /// Wraps `data`.
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { data }
    }
}

/// Author reference embedded in a question response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorResponse {
    /// User ID.
    pub id: String,
    /// User name.
    pub name: String,
}

impl From<&User> for CreatorResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
        }
    }
}

/// Response DTO for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResponse {
    /// Question ID.
    pub id: String,
    /// Question text.
    pub question: String,
    /// Current status.
    pub status: QuestionStatus,
    /// Author of the question.
    pub created_by: CreatorResponse,
    /// Creation timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub created_at: String,
    /// Last update timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub updated_at: String,
}

impl QuestionResponse {
    /// Builds the response for `question` authored by `creator`.
    #[must_use]
    pub fn new(question: &Question, creator: &User) -> Self {
        Self {
            id: question.id.to_string(),
            question: question.question.clone(),
            status: question.status.clone(),
            created_by: CreatorResponse::from(creator),
            created_at: question.created_at.to_string(),
            updated_at: question.updated_at.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QuestionId, Timestamp, UserId};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    #[rstest]
    fn test_update_request_missing_question_defaults_to_none() {
        let request: UpdateQuestionRequest = serde_json::from_str("{}").unwrap();
        assert!(request.question.is_none());
    }

    #[rstest]
    fn test_update_request_ignores_other_fields() {
        let request: UpdateQuestionRequest =
            serde_json::from_str(r#"{"question":"Why?","status":"published"}"#).unwrap();
        assert_eq!(request.question.as_deref(), Some("Why?"));
    }

    #[rstest]
    fn test_question_response_shape() {
        let creator = User::new(UserId::generate(), "Grace", "token");
        let created = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap());
        let updated = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 2, 3, 16, 5, 6).unwrap());
        let question = Question::new(
            QuestionId::generate(),
            "What is the shape?",
            creator.id.clone(),
            created,
        )
        .reword("What is the final shape?", updated);

        let json = serde_json::to_value(DataResponse::new(QuestionResponse::new(
            &question, &creator,
        )))
        .unwrap();

        let data = &json["data"];
        assert_eq!(data["id"], question.id.to_string());
        assert_eq!(data["question"], "What is the final shape?");
        assert_eq!(data["status"], "draft");
        assert_eq!(data["created_by"]["id"], creator.id.to_string());
        assert_eq!(data["created_by"]["name"], "Grace");
        assert_eq!(data["created_at"], "2024-02-03 04:05:06");
        assert_eq!(data["updated_at"], "2024-02-03 16:05:06");
    }
}
