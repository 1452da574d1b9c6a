//! In-memory repository implementations.
//!
//! Suitable for tests and local development. Each store keeps its records
//! behind an `Arc<RwLock<...>>`; every check-then-write runs under a single
//! write guard, so concurrent updates cannot both pass the uniqueness check.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Question, QuestionId, Timestamp, User, UserId};
use crate::infrastructure::{
    QuestionRepository, QuestionUniqueness, RepositoryError, UserRepository,
};

fn text_taken_by_other(
    questions: &HashMap<QuestionId, Question>,
    text: &str,
    excluding: &QuestionId,
) -> bool {
    questions
        .values()
        .any(|question| question.question == text && &question.id != excluding)
}

// =============================================================================
// In-Memory Question Repository
// =============================================================================

/// In-memory implementation of `QuestionRepository`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuestionRepository {
    questions: Arc<RwLock<HashMap<QuestionId, Question>>>,
}

impl InMemoryQuestionRepository {
    /// Creates a new empty in-memory question repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionUniqueness for InMemoryQuestionRepository {
    async fn is_question_taken(
        &self,
        text: &str,
        excluding: &QuestionId,
    ) -> Result<bool, RepositoryError> {
        let guard = self.questions.read().await;
        Ok(text_taken_by_other(&guard, text, excluding))
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn find_by_id(&self, id: &QuestionId) -> Result<Option<Question>, RepositoryError> {
        let guard = self.questions.read().await;
        Ok(guard.get(id).cloned())
    }

    async fn insert(&self, question: &Question) -> Result<(), RepositoryError> {
        let mut guard = self.questions.write().await;

        if guard.contains_key(&question.id) {
            return Err(RepositoryError::UniqueViolation(format!(
                "questions.id {}",
                question.id
            )));
        }
        if text_taken_by_other(&guard, &question.question, &question.id) {
            return Err(RepositoryError::UniqueViolation(
                "questions.question".to_string(),
            ));
        }

        guard.insert(question.id.clone(), question.clone());
        Ok(())
    }

    async fn update_text(
        &self,
        id: &QuestionId,
        text: &str,
        updated_at: &Timestamp,
    ) -> Result<Question, RepositoryError> {
        let mut guard = self.questions.write().await;

        if text_taken_by_other(&guard, text, id) {
            return Err(RepositoryError::UniqueViolation(
                "questions.question".to_string(),
            ));
        }

        let existing = guard
            .remove(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Question {id}")))?;
        let updated = existing.reword(text, updated_at.clone());
        guard.insert(id.clone(), updated.clone());
        Ok(updated)
    }
}

// =============================================================================
// In-Memory User Repository
// =============================================================================

/// In-memory implementation of `UserRepository`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory user repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_api_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let guard = self.users.read().await;
        Ok(guard.values().find(|user| user.api_token == token).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        let mut guard = self.users.write().await;

        if guard.contains_key(&user.id) {
            return Err(RepositoryError::UniqueViolation(format!("users.id {}", user.id)));
        }
        if guard.values().any(|existing| existing.api_token == user.api_token) {
            return Err(RepositoryError::UniqueViolation(
                "users.api_token".to_string(),
            ));
        }

        guard.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
