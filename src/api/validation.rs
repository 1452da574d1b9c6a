//! Validation of question updates.
//!
//! Combines the pure text and status rules with the store-backed
//! uniqueness query. Every failing rule is collected; nothing short-circuits
//! after the first failure.

use thiserror::Error;

use super::dto::UpdateQuestionRequest;
use crate::domain::{
    FieldErrors, QUESTION_FIELD, Question, RuleViolation, check_editable, check_question_text,
};
use crate::infrastructure::{QuestionUniqueness, RepositoryError};

/// A payload that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestionUpdate {
    question: String,
}

impl ValidatedQuestionUpdate {
    /// The normalized question text to persist.
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Consumes the update, returning the text.
    #[must_use]
    pub fn into_question(self) -> String {
        self.question
    }
}

/// Why a payload could not be validated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// One or more rules failed.
    #[error("validation failed")]
    Invalid(FieldErrors),
    /// The uniqueness query itself failed.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Validates `payload` against the stored `current` question.
///
/// The text is trimmed before the rules run. The uniqueness query excludes
/// `current.id`, so resubmitting the stored text is not a conflict. The
/// draft-status rule is checked even when the text is unchanged.
///
/// # Errors
///
/// - `ValidationFailure::Invalid` with every violated rule on `question`.
/// - `ValidationFailure::Store` if the uniqueness query fails.
pub async fn validate_question_update<U>(
    payload: &UpdateQuestionRequest,
    current: &Question,
    uniqueness: &U,
) -> Result<ValidatedQuestionUpdate, ValidationFailure>
where
    U: QuestionUniqueness + ?Sized,
{
    let text = payload.question.as_deref().map(str::trim);
    let mut errors = FieldErrors::new();

    errors.extend(QUESTION_FIELD, check_question_text(text));

    if let Some(text) = text.filter(|text| !text.is_empty())
        && uniqueness.is_question_taken(text, &current.id).await?
    {
        errors.push(QUESTION_FIELD, RuleViolation::AlreadyTaken);
    }

    errors.extend(QUESTION_FIELD, check_editable(current));

    match text {
        Some(text) if errors.is_empty() => Ok(ValidatedQuestionUpdate {
            question: text.to_string(),
        }),
        _ => Err(ValidationFailure::Invalid(errors)),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QuestionId, QuestionStatus, Timestamp, UserId};
    use crate::infrastructure::{InMemoryQuestionRepository, QuestionRepository};
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Uniqueness capability with a fixed answer that counts its calls.
    struct FixedUniqueness {
        taken: bool,
        calls: AtomicUsize,
    }

    impl FixedUniqueness {
        const fn new(taken: bool) -> Self {
            Self {
                taken,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QuestionUniqueness for FixedUniqueness {
        async fn is_question_taken(
            &self,
            _text: &str,
            _excluding: &QuestionId,
        ) -> Result<bool, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.taken)
        }
    }

    struct FailingUniqueness;

    #[async_trait]
    impl QuestionUniqueness for FailingUniqueness {
        async fn is_question_taken(
            &self,
            _text: &str,
            _excluding: &QuestionId,
        ) -> Result<bool, RepositoryError> {
            Err(RepositoryError::DatabaseError("connection reset".to_string()))
        }
    }

    fn draft(text: &str) -> Question {
        Question::new(QuestionId::generate(), text, UserId::generate(), Timestamp::now())
    }

    fn invalid_errors(result: Result<ValidatedQuestionUpdate, ValidationFailure>) -> FieldErrors {
        match result {
            Err(ValidationFailure::Invalid(errors)) => errors,
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_valid_payload_is_trimmed_and_accepted() {
        let current = draft("Original question?");
        let uniqueness = FixedUniqueness::new(false);

        let validated = validate_question_update(
            &UpdateQuestionRequest::new("  Updating question?  "),
            &current,
            &uniqueness,
        )
        .await
        .unwrap();

        assert_eq!(validated.question(), "Updating question?");
        assert_eq!(uniqueness.calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[case(UpdateQuestionRequest::default())]
    #[case(UpdateQuestionRequest::new(""))]
    #[case(UpdateQuestionRequest::new("   "))]
    #[tokio::test]
    async fn test_missing_text_is_required(#[case] payload: UpdateQuestionRequest) {
        let uniqueness = FixedUniqueness::new(false);

        let errors = invalid_errors(
            validate_question_update(&payload, &draft("Original question?"), &uniqueness).await,
        );

        assert_eq!(errors.get(QUESTION_FIELD), &[RuleViolation::Required]);
        assert_eq!(uniqueness.calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_taken_text_is_rejected() {
        let errors = invalid_errors(
            validate_question_update(
                &UpdateQuestionRequest::new("Lorem ipsum jeremias?"),
                &draft("Original question?"),
                &FixedUniqueness::new(true),
            )
            .await,
        );

        assert_eq!(errors.get(QUESTION_FIELD), &[RuleViolation::AlreadyTaken]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_non_draft_is_rejected_even_with_valid_text() {
        let current = draft("Original question?").with_status(QuestionStatus::Published);

        let errors = invalid_errors(
            validate_question_update(
                &UpdateQuestionRequest::new("Question should have a mark?"),
                &current,
                &FixedUniqueness::new(false),
            )
            .await,
        );

        assert_eq!(errors.get(QUESTION_FIELD), &[RuleViolation::NotDraft]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_all_failures_are_reported_together() {
        let current = draft("Original question?").with_status(QuestionStatus::Published);

        let errors = invalid_errors(
            validate_question_update(
                &UpdateQuestionRequest::new("Short"),
                &current,
                &FixedUniqueness::new(true),
            )
            .await,
        );

        assert_eq!(
            errors.get(QUESTION_FIELD),
            &[
                RuleViolation::MissingQuestionMark,
                RuleViolation::TooShort { min: 10 },
                RuleViolation::AlreadyTaken,
                RuleViolation::NotDraft,
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_missing_text_on_published_reports_both() {
        let current = draft("Original question?").with_status(QuestionStatus::Published);

        let errors = invalid_errors(
            validate_question_update(
                &UpdateQuestionRequest::default(),
                &current,
                &FixedUniqueness::new(false),
            )
            .await,
        );

        assert_eq!(
            errors.get(QUESTION_FIELD),
            &[RuleViolation::Required, RuleViolation::NotDraft]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_store_failure_is_propagated() {
        let result = validate_question_update(
            &UpdateQuestionRequest::new("Valid question here?"),
            &draft("Original question?"),
            &FailingUniqueness,
        )
        .await;

        assert!(matches!(result, Err(ValidationFailure::Store(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_resubmitting_own_text_is_not_a_conflict() {
        let repository = InMemoryQuestionRepository::new();
        let current = draft("Lorem ipsum jeremias?");
        repository.insert(&current).await.unwrap();

        let validated = validate_question_update(
            &UpdateQuestionRequest::new("Lorem ipsum jeremias?"),
            &current,
            &repository,
        )
        .await
        .unwrap();

        assert_eq!(validated.into_question(), "Lorem ipsum jeremias?");
    }

    #[rstest]
    #[tokio::test]
    async fn test_resubmitting_own_text_on_published_still_fails() {
        let repository = InMemoryQuestionRepository::new();
        let current = draft("Lorem ipsum jeremias?").with_status(QuestionStatus::Published);
        repository.insert(&current).await.unwrap();

        let errors = invalid_errors(
            validate_question_update(
                &UpdateQuestionRequest::new("Lorem ipsum jeremias?"),
                &current,
                &repository,
            )
            .await,
        );

        assert_eq!(errors.get(QUESTION_FIELD), &[RuleViolation::NotDraft]);
    }
}
