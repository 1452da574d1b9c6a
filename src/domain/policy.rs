//! Ownership policy for question edits.
//!
//! Only the author of a question may change it. The decision is a pure
//! function of the principal and the stored record so it can be checked
//! before any validation work runs.

use super::question::Question;
use super::user::User;

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// The principal may edit the record.
    Allow,
    /// The principal may not touch the record.
    Deny,
}

impl Authorization {
    /// Returns `true` for [`Authorization::Allow`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides whether `principal` may update `question`.
///
/// Allowed only when the principal authored the question.
#[must_use]
pub fn authorize(principal: &User, question: &Question) -> Authorization {
    if principal.id == question.user_id {
        Authorization::Allow
    } else {
        Authorization::Deny
    }
}
