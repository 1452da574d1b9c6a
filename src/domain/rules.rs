//! Business rules for question text and edit eligibility.
//!
//! The checks here are pure. The store-backed uniqueness rule is combined
//! with them in `api::validation`.

use std::collections::BTreeMap;

use super::question::Question;

/// Field name every question rule reports against.
pub const QUESTION_FIELD: &str = "question";

/// Minimum number of characters in a question.
pub const MIN_QUESTION_LENGTH: usize = 10;

/// A single broken rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    /// Text absent or blank.
    #[error("The question field is required.")]
    Required,
    /// Text does not end with `?`.
    #[error("The question should end with question mark (?).")]
    MissingQuestionMark,
    /// Text shorter than [`MIN_QUESTION_LENGTH`].
    #[error("The question field must be at least {min} characters.")]
    TooShort {
        /// Required minimum.
        min: usize,
    },
    /// Another question already uses this text.
    #[error("The question has already been taken.")]
    AlreadyTaken,
    /// The stored question is no longer a draft.
    #[error("The question should be a draft to be able to edit.")]
    NotDraft,
}

/// Aggregated rule violations keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<RuleViolation>>);

impl FieldErrors {
    /// Creates an empty error set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Records `violation` against `field`.
    pub fn push(&mut self, field: impl Into<String>, violation: RuleViolation) {
        self.0.entry(field.into()).or_default().push(violation);
    }

    /// Records every violation in `violations` against `field`.
    pub fn extend(
        &mut self,
        field: &str,
        violations: impl IntoIterator<Item = RuleViolation>,
    ) {
        for violation in violations {
            self.push(field, violation);
        }
    }

    /// Returns true if no rule failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the violations recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> &[RuleViolation] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// Returns true if `field` carries `violation`.
    #[must_use]
    pub fn contains(&self, field: &str, violation: RuleViolation) -> bool {
        self.get(field).contains(&violation)
    }

    /// Renders the violations as human-readable messages per field.
    #[must_use]
    pub fn messages(&self) -> BTreeMap<String, Vec<String>> {
        self.0
            .iter()
            .map(|(field, violations)| {
                (
                    field.clone(),
                    violations.iter().map(ToString::to_string).collect(),
                )
            })
            .collect()
    }

    /// Returns the first message, used as the summary of a failed request.
    #[must_use]
    pub fn first_message(&self) -> Option<String> {
        self.0
            .values()
            .flat_map(|violations| violations.iter())
            .next()
            .map(ToString::to_string)
    }
}

/// Checks the shape of already-trimmed question text.
///
/// A blank value yields only [`RuleViolation::Required`]; the other checks
/// need a value to inspect.
#[must_use]
pub fn check_question_text(text: Option<&str>) -> Vec<RuleViolation> {
    let Some(text) = text.filter(|text| !text.is_empty()) else {
        return vec![RuleViolation::Required];
    };

    let mut violations = Vec::new();

    if !text.ends_with('?') {
        violations.push(RuleViolation::MissingQuestionMark);
    }

    if text.chars().count() < MIN_QUESTION_LENGTH {
        violations.push(RuleViolation::TooShort {
            min: MIN_QUESTION_LENGTH,
        });
    }

    violations
}

/// Checks that the stored question may still be edited.
///
/// Depends only on the current record, never on the payload.
#[must_use]
pub const fn check_editable(current: &Question) -> Option<RuleViolation> {
    if current.is_editable() {
        None
    } else {
        Some(RuleViolation::NotDraft)
    }
}

// =============================================================================
// Tests
// =============================================================================
