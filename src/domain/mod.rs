//! Domain module for question editing.
//!
//! This module contains domain models, value objects, and the pure rules
//! that govern who may edit a question and what a valid question looks like.

pub mod policy;
pub mod question;
pub mod rules;
pub mod user;

pub use policy::{Authorization, authorize};
pub use question::{Question, QuestionId, QuestionStatus, Timestamp};
pub use rules::{
    FieldErrors, MIN_QUESTION_LENGTH, QUESTION_FIELD, RuleViolation, check_editable,
    check_question_text,
};
pub use user::{User, UserId};
