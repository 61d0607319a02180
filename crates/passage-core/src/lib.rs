//! Core migration and deletion engine.
//!
//! Maps source identity records (a Cognito-style export) to target identity
//! and document writes, decides create-vs-update against the identity
//! store, applies a bounded conflict retry policy for the phone field, and
//! records one auditable outcome per processed user.
//!
//! The target stores are external collaborators reached through the
//! [`store::IdentityStore`] and [`store::DocumentStore`] traits; nothing in
//! this crate caches their state beyond the single operation in flight.

pub mod deletion;
pub mod document;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod outcome;
pub mod record;
pub mod retry;
pub mod store;

pub use deletion::{
    DeletionAction, DeletionEngine, DeletionKey, DeletionMode, DeletionOutcome, DeletionRequest,
};
pub use document::UserDocument;
pub use engine::{MigrateOptions, MigrationEngine, ResolvedAction};
pub use error::{StoreError, StoreResult};
pub use normalize::{normalize, source_id, NormalizedUser, SkipReason};
pub use outcome::{MigrationAction, MigrationOutcome, MigrationSummary, OutcomeLog};
pub use record::{SourceAttribute, SourceExport, SourceUserRecord};
pub use retry::{ConflictRetryPolicy, ConflictRule, DroppableField};
pub use store::{DocumentStore, IdentityStore, IdentityWrite};
