//! Per-record migration engine.
//!
//! Drives one source record through normalize → resolve → identity write
//! (with the conflict retry policy) → document write → best-effort reset
//! link, and emits one outcome per record. Records are processed strictly
//! sequentially, in export order; a failure never crosses a record
//! boundary, so the batch always runs to completion.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::document::UserDocument;
use crate::error::{StoreError, StoreResult};
use crate::normalize::{normalize, source_id, NormalizedUser, SkipReason};
use crate::outcome::{MigrationOutcome, OutcomeLog};
use crate::record::SourceUserRecord;
use crate::retry::{ConflictRetryPolicy, DroppableField};
use crate::store::{DocumentStore, IdentityStore, IdentityWrite};

/// Source status that is always migrated regardless of filtering.
const STATUS_CONFIRMED: &str = "CONFIRMED";

/// Write action decided by the identity resolution step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAction {
    /// No identity entry exists for the email; create one.
    CreateNew,
    /// An entry exists; overwrite its fields.
    UpdateExisting(String),
}

/// Run configuration, threaded explicitly into the engine.
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Initial password set on newly created identity entries. Every
    /// created entry also gets a password-reset link, so this value is
    /// never the user's long-term credential.
    pub initial_password: String,
    /// Skip records whose status is not CONFIRMED.
    pub only_confirmed: bool,
    /// Conflict retry policy for identity writes.
    pub retry_policy: ConflictRetryPolicy,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            initial_password: "Default@123".to_string(),
            only_confirmed: false,
            retry_policy: ConflictRetryPolicy::default(),
        }
    }
}

/// Migration engine over a pair of target-store collaborators.
pub struct MigrationEngine<I, D> {
    identity: I,
    documents: D,
    options: MigrateOptions,
}

impl<I: IdentityStore, D: DocumentStore> MigrationEngine<I, D> {
    pub fn new(identity: I, documents: D, options: MigrateOptions) -> Self {
        Self {
            identity,
            documents,
            options,
        }
    }

    /// Decide create-vs-update for a normalized user.
    ///
    /// A lookup miss means create. Any lookup failure fails the record and
    /// is never read as a miss.
    pub async fn resolve(&self, user: &NormalizedUser) -> StoreResult<ResolvedAction> {
        Ok(match self.identity.find_uid_by_email(&user.email).await? {
            Some(uid) => ResolvedAction::UpdateExisting(uid),
            None => ResolvedAction::CreateNew,
        })
    }

    /// Migrate one source record to a terminal outcome.
    pub async fn migrate_record(&self, record: &SourceUserRecord) -> MigrationOutcome {
        if self.options.only_confirmed && record.status != STATUS_CONFIRMED {
            warn!(username = %record.username, status = %record.status, "skipping record");
            return MigrationOutcome::skipped(source_id(record), SkipReason::NotConfirmed.to_string());
        }

        let user = match normalize(record) {
            Ok(user) => user,
            Err(reason) => {
                warn!(username = %record.username, %reason, "skipping record");
                return MigrationOutcome::skipped(source_id(record), reason.to_string());
            }
        };

        let action = match self.resolve(&user).await {
            Ok(action) => action,
            Err(err) => {
                error!(email = %user.email, %err, "identity lookup failed");
                return MigrationOutcome::failed(&user.source_id, err.to_string());
            }
        };

        let (uid, phone_retried) = match self.write_identity(record, &user, &action).await {
            Ok(written) => written,
            Err((err, phone_retried)) => {
                error!(email = %user.email, %err, "identity write failed");
                return MigrationOutcome::failed(&user.source_id, err.to_string())
                    .with_phone_retried(phone_retried);
            }
        };

        let document = UserDocument::assemble(record, &user, &uid, Utc::now());
        if let Err(err) = self.documents.put(&uid, &document).await {
            error!(email = %user.email, uid = %uid, %err, "document write failed");
            return MigrationOutcome::failed(&user.source_id, err.to_string())
                .with_phone_retried(phone_retried);
        }

        // Best effort: a reset-link failure is recorded on the outcome but
        // does not revert the migration.
        let link_failure = match self.identity.password_reset_link(&user.email).await {
            Ok(link) => {
                info!(email = %user.email, link = %link, "password reset link generated");
                None
            }
            Err(err) => {
                warn!(email = %user.email, %err, "password reset link generation failed");
                Some(format!("password reset link: {err}"))
            }
        };

        let mut outcome = match &action {
            ResolvedAction::CreateNew => {
                info!(email = %user.email, uid = %uid, "user created");
                MigrationOutcome::created(&user.source_id, &uid)
            }
            ResolvedAction::UpdateExisting(_) => {
                info!(email = %user.email, uid = %uid, "user updated");
                MigrationOutcome::updated(&user.source_id, &uid)
            }
        }
        .with_phone_retried(phone_retried);
        if let Some(reason) = link_failure {
            outcome = outcome.with_reason(reason);
        }
        outcome
    }

    /// Migrate a batch in export order, one record at a time.
    pub async fn migrate_all(&self, records: &[SourceUserRecord]) -> OutcomeLog {
        let mut log = OutcomeLog::new();
        for record in records {
            log.append(self.migrate_record(record).await);
        }
        log
    }

    /// Identity write with the conflict retry policy applied.
    ///
    /// Returns the authoritative identity key and whether the phone field
    /// was dropped on a retry. On failure the error is the one from the
    /// last attempt.
    async fn write_identity(
        &self,
        record: &SourceUserRecord,
        user: &NormalizedUser,
        action: &ResolvedAction,
    ) -> Result<(String, bool), (StoreError, bool)> {
        let mut write = self.identity_write(record, user, action);
        let policy = &self.options.retry_policy;
        let mut dropped: Vec<DroppableField> = Vec::new();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = match action {
                ResolvedAction::CreateNew => self.identity.create(&write).await,
                ResolvedAction::UpdateExisting(uid) => {
                    self.identity.update(uid, &write).await.map(|()| uid.clone())
                }
            };

            let err = match result {
                Ok(uid) => return Ok((uid, !dropped.is_empty())),
                Err(err) => err,
            };

            if attempt >= policy.max_attempts() {
                return Err((err, !dropped.is_empty()));
            }
            let Some(rule) = policy.rule_for(&err) else {
                return Err((err, !dropped.is_empty()));
            };
            if dropped.contains(&rule.field) {
                return Err((err, !dropped.is_empty()));
            }

            warn!(
                email = %user.email,
                field = ?rule.field,
                %err,
                "identity write conflict, retrying without field"
            );
            write = rule.strip(write);
            dropped.push(rule.field);
        }
    }

    fn identity_write(
        &self,
        record: &SourceUserRecord,
        user: &NormalizedUser,
        action: &ResolvedAction,
    ) -> IdentityWrite {
        let creating = matches!(action, ResolvedAction::CreateNew);
        IdentityWrite {
            // The source username doubles as the requested key on create.
            uid: creating.then(|| record.username.clone()),
            email: user.email.clone(),
            email_verified: user.email_verified,
            password: creating.then(|| self.options.initial_password.clone()),
            phone: user.phone.clone(),
            phone_verified: user.phone_verified,
            display_name: user.display_name(),
            disabled: !record.enabled,
        }
    }
}
