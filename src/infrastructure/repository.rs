//! Repository traits for domain entities.
//!
//! The stores are collaborators of the update path: they load records,
//! answer the uniqueness query and apply the final write. Everything behind
//! these traits can be swapped at runtime through the factory.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Question, QuestionId, Timestamp, User};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Entity was not found.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

// =============================================================================
// Question Repository
// =============================================================================

/// The uniqueness query the validation rules depend on.
///
/// Kept separate from [`QuestionRepository`] so validation can be exercised
/// against a bare capability.
#[async_trait]
pub trait QuestionUniqueness: Send + Sync {
    /// Returns `true` if a question other than `excluding` already has
    /// exactly this text (case-sensitive).
    async fn is_question_taken(
        &self,
        text: &str,
        excluding: &QuestionId,
    ) -> Result<bool, RepositoryError>;
}

/// Repository trait for Question entities.
#[async_trait]
pub trait QuestionRepository: QuestionUniqueness {
    /// Finds a question by its ID.
    ///
    /// Returns `Ok(None)` if no question has this ID.
    async fn find_by_id(&self, id: &QuestionId) -> Result<Option<Question>, RepositoryError>;

    /// Inserts a new question.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::UniqueViolation` if the ID or the text is
    /// already in use.
    async fn insert(&self, question: &Question) -> Result<(), RepositoryError>;

    /// Replaces the text of an existing question and refreshes `updated_at`.
    ///
    /// No other column is written. Returns the stored question after the
    /// write.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::NotFound` if the question does not exist.
    /// - `RepositoryError::UniqueViolation` if another question took the
    ///   text since it was validated.
    async fn update_text(
        &self,
        id: &QuestionId,
        text: &str,
        updated_at: &Timestamp,
    ) -> Result<Question, RepositoryError>;
}

// =============================================================================
// User Repository
// =============================================================================

/// Repository trait for User entities.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds the user holding `token`.
    async fn find_by_api_token(&self, token: &str) -> Result<Option<User>, RepositoryError>;

    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::UniqueViolation` if the ID or token is
    /// already in use.
    async fn insert(&self, user: &User) -> Result<(), RepositoryError>;
}
