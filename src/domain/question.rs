//! Question domain model.
//!
//! A question is authored by a user and can only be reworded while it is
//! still a draft.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a question.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionId(Uuid);

impl QuestionId {
    /// Creates a `QuestionId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Generates a new time-ordered `QuestionId` (UUID v7).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A timestamp wrapper for `DateTime<Utc>`.
///
/// Renders as `YYYY-MM-DD HH:MM:SS`, which is also the wire format.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    ///
    /// **Note**: reads the system clock; handlers capture it once per request.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Publication status of a question.
///
/// Statuses the service does not model are kept verbatim in `Other` so a
/// stored record always loads; only `Draft` is editable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum QuestionStatus {
    /// Work in progress; the only editable status.
    #[default]
    Draft,
    /// Visible to others and frozen.
    Published,
    /// Any other stored status, e.g. `archived`.
    Other(String),
}

impl QuestionStatus {
    /// Returns `true` if a question in this status may be edited.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns the storage and wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Other(status) => status,
        }
    }
}

impl std::fmt::Display for QuestionStatus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl From<&str> for QuestionStatus {
    fn from(value: &str) -> Self {
        match value {
            "draft" => Self::Draft,
            "published" => Self::Published,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for QuestionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "draft" => Self::Draft,
            "published" => Self::Published,
            _ => Self::Other(value),
        }
    }
}

impl From<QuestionStatus> for String {
    fn from(status: QuestionStatus) -> Self {
        match status {
            QuestionStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

// =============================================================================
// Question
// =============================================================================

/// A question owned by the user who created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier, assigned at creation.
    pub id: QuestionId,
    /// The question text.
    pub question: String,
    /// Current publication status.
    pub status: QuestionStatus,
    /// The author. Never changes after creation.
    pub user_id: UserId,
    /// Timestamp when the question was created.
    pub created_at: Timestamp,
    /// Timestamp when the question was last updated.
    pub updated_at: Timestamp,
}

impl Question {
    /// Creates a draft question authored by `user_id`.
    #[must_use]
    pub fn new(
        id: QuestionId,
        question: impl Into<String>,
        user_id: UserId,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            question: question.into(),
            status: QuestionStatus::Draft,
            user_id,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        }
    }

    /// Returns a new question with the given status.
    #[must_use]
    pub fn with_status(self, status: QuestionStatus) -> Self {
        Self { status, ..self }
    }

    /// Returns a new question with its text replaced and `updated_at` refreshed.
    ///
    /// Every other field is carried over untouched.
    #[must_use]
    pub fn reword(self, question: impl Into<String>, updated_at: Timestamp) -> Self {
        Self {
            question: question.into(),
            updated_at,
            ..self
        }
    }

    /// Returns `true` if the question may still be edited.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        self.status.is_editable()
    }
}

// =============================================================================
// Tests
// =============================================================================
