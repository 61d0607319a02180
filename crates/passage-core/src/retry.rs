//! Conflict-driven retry policy for identity writes.
//!
//! A write that fails on a non-essential field is retried once with that
//! field dropped. The policy is a value rather than inline control flow,
//! so further field-dropping rules can be added without touching the
//! engine's state machine.

use crate::error::StoreError;
use crate::store::IdentityWrite;

/// Identity field the policy may drop after a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroppableField {
    /// The phone number, together with its verification flag.
    Phone,
}

/// One conflict rule: which error class allows dropping which field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictRule {
    pub field: DroppableField,
}

impl ConflictRule {
    /// Whether this rule applies to the given write failure.
    pub fn matches(&self, error: &StoreError) -> bool {
        match self.field {
            DroppableField::Phone => error.is_phone_conflict(),
        }
    }

    /// Drop the rule's field from the write.
    #[must_use]
    pub fn strip(&self, write: IdentityWrite) -> IdentityWrite {
        match self.field {
            DroppableField::Phone => write.without_phone(),
        }
    }
}

/// Bounded retry policy for conflict-classified write failures.
#[derive(Debug, Clone)]
pub struct ConflictRetryPolicy {
    max_attempts: u32,
    rules: Vec<ConflictRule>,
}

impl Default for ConflictRetryPolicy {
    /// Two attempts total; a phone conflict drops the phone field.
    fn default() -> Self {
        Self {
            max_attempts: 2,
            rules: vec![ConflictRule {
                field: DroppableField::Phone,
            }],
        }
    }
}

impl ConflictRetryPolicy {
    /// Total write attempts allowed per record, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The first rule whose error class matches, if any.
    pub fn rule_for(&self, error: &StoreError) -> Option<ConflictRule> {
        self.rules.iter().copied().find(|rule| rule.matches(error))
    }
}
