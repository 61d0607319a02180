//! Per-record migration outcomes and the append-only outcome log.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Terminal action recorded for one processed source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationAction {
    Created,
    Updated,
    Skipped,
    Failed,
}

impl fmt::Display for MigrationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationAction::Created => write!(f, "created"),
            MigrationAction::Updated => write!(f, "updated"),
            MigrationAction::Skipped => write!(f, "skipped"),
            MigrationAction::Failed => write!(f, "failed"),
        }
    }
}

/// Audit record for one processed source record. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationOutcome {
    pub source_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_uid: Option<String>,
    pub action: MigrationAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub phone_retried: bool,
}

impl MigrationOutcome {
    pub fn created(source_id: impl Into<String>, target_uid: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_uid: Some(target_uid.into()),
            action: MigrationAction::Created,
            reason: None,
            phone_retried: false,
        }
    }

    pub fn updated(source_id: impl Into<String>, target_uid: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_uid: Some(target_uid.into()),
            action: MigrationAction::Updated,
            reason: None,
            phone_retried: false,
        }
    }

    pub fn skipped(source_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_uid: None,
            action: MigrationAction::Skipped,
            reason: Some(reason.into()),
            phone_retried: false,
        }
    }

    pub fn failed(source_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_uid: None,
            action: MigrationAction::Failed,
            reason: Some(reason.into()),
            phone_retried: false,
        }
    }

    #[must_use]
    pub fn with_phone_retried(mut self, phone_retried: bool) -> Self {
        self.phone_retried = phone_retried;
        self
    }

    /// Attach a secondary reason, e.g. a best-effort step that failed
    /// without flipping the outcome.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Append-only sequence of outcomes for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutcomeLog {
    outcomes: Vec<MigrationOutcome>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, outcome: MigrationOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn iter(&self) -> impl Iterator<Item = &MigrationOutcome> {
        self.outcomes.iter()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Aggregate counts over the log.
    pub fn summary(&self) -> MigrationSummary {
        let mut summary = MigrationSummary {
            processed: self.outcomes.len(),
            ..MigrationSummary::default()
        };
        for outcome in &self.outcomes {
            match outcome.action {
                MigrationAction::Created => summary.created += 1,
                MigrationAction::Updated => summary.updated += 1,
                MigrationAction::Skipped => summary.skipped += 1,
                MigrationAction::Failed => summary.failed += 1,
            }
        }
        summary
    }
}

/// End-of-run counts derived from the outcome log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}
