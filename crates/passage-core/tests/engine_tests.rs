//! Migration engine tests against recording in-memory stores.
//!
//! Covers the skip invariant, create-vs-update resolution, the
//! phone-conflict retry policy, document round-trip preservation, and the
//! per-record failure containment of a full batch run.

mod common;

use std::sync::Arc;

use common::{record_with, FakeDocumentStore, FakeIdentityStore};
use passage_core::{MigrateOptions, MigrationAction, MigrationEngine};

fn engine(
    identity: &Arc<FakeIdentityStore>,
    documents: &Arc<FakeDocumentStore>,
) -> MigrationEngine<Arc<FakeIdentityStore>, Arc<FakeDocumentStore>> {
    MigrationEngine::new(identity.clone(), documents.clone(), MigrateOptions::default())
}

#[tokio::test]
async fn record_without_email_is_skipped_and_stores_are_never_called() {
    let identity = Arc::new(FakeIdentityStore::default());
    let documents = Arc::new(FakeDocumentStore::default());
    let engine = engine(&identity, &documents);

    let record = record_with("no-email", &[("given_name", "Jane")]);
    let outcome = engine.migrate_record(&record).await;

    assert_eq!(outcome.action, MigrationAction::Skipped);
    assert_eq!(outcome.reason.as_deref(), Some("missing email"));
    assert!(outcome.target_uid.is_none());
    assert!(identity.calls().is_empty());
    assert!(documents.calls().is_empty());
}

#[tokio::test]
async fn new_user_is_created_with_document_and_reset_link() {
    let identity = Arc::new(FakeIdentityStore::default());
    let documents = Arc::new(FakeDocumentStore::default());
    let engine = engine(&identity, &documents);

    let record = record_with(
        "jane",
        &[
            ("sub", "sub-jane"),
            ("email", "jane@example.com"),
            ("email_verified", "true"),
            ("phone_number", "+15550001111"),
            ("given_name", "Jane"),
            ("family_name", "Doe"),
            ("custom_flag", "z"),
        ],
    );
    let outcome = engine.migrate_record(&record).await;

    assert_eq!(outcome.action, MigrationAction::Created);
    assert_eq!(outcome.source_id, "sub-jane");
    assert_eq!(outcome.target_uid.as_deref(), Some("jane"));
    assert!(!outcome.phone_retried);
    assert!(outcome.reason.is_none());

    let calls = identity.calls();
    assert_eq!(
        calls,
        vec![
            "lookup:jane@example.com".to_string(),
            "create".to_string(),
            "reset_link:jane@example.com".to_string(),
        ]
    );

    let writes = identity.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].uid.as_deref(), Some("jane"));
    assert_eq!(writes[0].display_name.as_deref(), Some("Jane Doe"));
    assert!(writes[0].email_verified);
    assert_eq!(writes[0].password.as_deref(), Some("Default@123"));

    let document = documents.document("jane").expect("document must be stored");
    assert_eq!(document.attributes.get("custom_flag").map(String::as_str), Some("z"));
    assert_eq!(document.firebase_uid, "jane");
    assert_eq!(document.source_id, "sub-jane");
}

#[tokio::test]
async fn existing_user_is_updated_not_created() {
    let identity = Arc::new(FakeIdentityStore::with_existing_user(
        "jane@example.com",
        "existing-uid",
    ));
    let documents = Arc::new(FakeDocumentStore::default());
    let engine = engine(&identity, &documents);

    let record = record_with("jane", &[("email", "jane@example.com")]);
    let outcome = engine.migrate_record(&record).await;

    assert_eq!(outcome.action, MigrationAction::Updated);
    assert_eq!(outcome.target_uid.as_deref(), Some("existing-uid"));
    assert!(identity.calls().contains(&"update:existing-uid".to_string()));
    assert!(!identity.calls().contains(&"create".to_string()));

    // Update writes carry neither a requested uid nor a password.
    let writes = identity.writes();
    assert!(writes[0].uid.is_none());
    assert!(writes[0].password.is_none());
}

#[tokio::test]
async fn rerunning_a_migrated_record_converges_to_update() {
    let identity = Arc::new(FakeIdentityStore::default());
    let documents = Arc::new(FakeDocumentStore::default());
    let engine = engine(&identity, &documents);

    let record = record_with("jane", &[("email", "jane@example.com")]);

    let first = engine.migrate_record(&record).await;
    assert_eq!(first.action, MigrationAction::Created);

    let second = engine.migrate_record(&record).await;
    assert_eq!(second.action, MigrationAction::Updated);
    assert_eq!(second.target_uid, first.target_uid);
}

#[tokio::test]
async fn phone_conflict_retries_exactly_once_without_phone() {
    let identity = Arc::new(FakeIdentityStore {
        reject_phone: true,
        ..FakeIdentityStore::default()
    });
    let documents = Arc::new(FakeDocumentStore::default());
    let engine = engine(&identity, &documents);

    let record = record_with(
        "jane",
        &[
            ("email", "jane@example.com"),
            ("phone_number", "+15550001111"),
        ],
    );
    let outcome = engine.migrate_record(&record).await;

    assert_eq!(outcome.action, MigrationAction::Created);
    assert!(outcome.phone_retried);

    let writes = identity.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].phone.as_deref(), Some("+15550001111"));
    assert!(writes[1].phone.is_none());

    // The phone is only omitted from the identity write, not from storage.
    let document = documents.document("jane").expect("document must be stored");
    assert_eq!(
        document.attributes.get("phone_number").map(String::as_str),
        Some("+15550001111")
    );
    assert_eq!(document.phone_number.as_deref(), Some("+15550001111"));
}

#[tokio::test]
async fn failed_retry_reports_the_retry_reason() {
    let identity = Arc::new(FakeIdentityStore {
        reject_phone: true,
        fail_writes: Some("backend unavailable"),
        ..FakeIdentityStore::default()
    });
    let documents = Arc::new(FakeDocumentStore::default());
    let engine = engine(&identity, &documents);

    let record = record_with(
        "jane",
        &[
            ("email", "jane@example.com"),
            ("phone_number", "+15550001111"),
        ],
    );
    let outcome = engine.migrate_record(&record).await;

    assert_eq!(outcome.action, MigrationAction::Failed);
    assert!(outcome.phone_retried);
    assert_eq!(identity.writes().len(), 2);
    let reason = outcome.reason.expect("failure must carry a reason");
    assert!(reason.contains("backend unavailable"), "got: {reason}");
    assert!(!reason.contains("phone"), "got: {reason}");
}

#[tokio::test]
async fn non_conflict_write_failure_is_not_retried() {
    let identity = Arc::new(FakeIdentityStore {
        fail_writes: Some("PERMISSION_DENIED"),
        ..FakeIdentityStore::default()
    });
    let documents = Arc::new(FakeDocumentStore::default());
    let engine = engine(&identity, &documents);

    let record = record_with("jane", &[("email", "jane@example.com")]);
    let outcome = engine.migrate_record(&record).await;

    assert_eq!(outcome.action, MigrationAction::Failed);
    assert!(!outcome.phone_retried);
    assert_eq!(identity.writes().len(), 1);
    assert!(documents.calls().is_empty());
}

#[tokio::test]
async fn lookup_failure_fails_the_record_instead_of_creating() {
    let identity = Arc::new(FakeIdentityStore {
        fail_lookup: true,
        ..FakeIdentityStore::default()
    });
    let documents = Arc::new(FakeDocumentStore::default());
    let engine = engine(&identity, &documents);

    let record = record_with("jane", &[("email", "jane@example.com")]);
    let outcome = engine.migrate_record(&record).await;

    assert_eq!(outcome.action, MigrationAction::Failed);
    assert!(identity.writes().is_empty());
}

#[tokio::test]
async fn document_write_failure_fails_the_record() {
    let identity = Arc::new(FakeIdentityStore::default());
    let documents = Arc::new(FakeDocumentStore {
        fail_put: true,
        ..FakeDocumentStore::default()
    });
    let engine = engine(&identity, &documents);

    let record = record_with("jane", &[("email", "jane@example.com")]);
    let outcome = engine.migrate_record(&record).await;

    assert_eq!(outcome.action, MigrationAction::Failed);
    assert!(outcome.reason.unwrap().contains("firestore"));
}

#[tokio::test]
async fn reset_link_failure_does_not_revert_the_migration() {
    let identity = Arc::new(FakeIdentityStore {
        fail_reset_link: true,
        ..FakeIdentityStore::default()
    });
    let documents = Arc::new(FakeDocumentStore::default());
    let engine = engine(&identity, &documents);

    let record = record_with("jane", &[("email", "jane@example.com")]);
    let outcome = engine.migrate_record(&record).await;

    assert_eq!(outcome.action, MigrationAction::Created);
    let reason = outcome.reason.expect("secondary reason must be recorded");
    assert!(reason.starts_with("password reset link:"), "got: {reason}");
}

#[tokio::test]
async fn only_confirmed_skips_unconfirmed_records() {
    let identity = Arc::new(FakeIdentityStore::default());
    let documents = Arc::new(FakeDocumentStore::default());
    let engine = MigrationEngine::new(
        identity.clone(),
        documents.clone(),
        MigrateOptions {
            only_confirmed: true,
            ..MigrateOptions::default()
        },
    );

    let mut record = record_with("jane", &[("email", "jane@example.com")]);
    record.status = "UNCONFIRMED".to_string();
    let outcome = engine.migrate_record(&record).await;

    assert_eq!(outcome.action, MigrationAction::Skipped);
    assert_eq!(outcome.reason.as_deref(), Some("status not CONFIRMED"));
    assert!(identity.calls().is_empty());
}

#[tokio::test]
async fn batch_runs_to_completion_with_mixed_outcomes() {
    let identity = Arc::new(FakeIdentityStore::default());
    let documents = Arc::new(FakeDocumentStore::default());
    let engine = engine(&identity, &documents);

    let records = vec![
        record_with(
            "user-a",
            &[
                ("email", "a@example.com"),
                ("phone_number", "+15550002222"),
            ],
        ),
        record_with("user-b", &[("given_name", "NoEmail")]),
    ];
    let log = engine.migrate_all(&records).await;

    assert_eq!(log.len(), 2);
    let outcomes: Vec<_> = log.iter().collect();
    assert_eq!(outcomes[0].action, MigrationAction::Created);
    assert!(!outcomes[0].phone_retried);
    assert_eq!(outcomes[1].action, MigrationAction::Skipped);
    assert_eq!(outcomes[1].reason.as_deref(), Some("missing email"));

    let summary = log.summary();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.created, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
}
