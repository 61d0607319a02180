//! Deletion engine: reverse a migration from either or both target stores.

use std::fmt;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::StoreResult;
use crate::store::{DocumentStore, IdentityStore};

/// Resolution key for a deletion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionKey {
    /// Direct identity key in the target store.
    TargetUid(String),
    /// Email, resolved through the same lookup path migration uses.
    Email(String),
}

impl fmt::Display for DeletionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionKey::TargetUid(uid) => write!(f, "{uid}"),
            DeletionKey::Email(email) => write!(f, "{email}"),
        }
    }
}

/// Which stores a deletion touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionMode {
    IdentityAndDocument,
    IdentityOnly,
    DocumentOnly,
}

/// One deletion request. Requests are independent and unordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub key: DeletionKey,
    pub mode: DeletionMode,
}

/// Terminal result of one deletion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionAction {
    Deleted,
    NotFound,
    Failed,
}

impl fmt::Display for DeletionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionAction::Deleted => write!(f, "deleted"),
            DeletionAction::NotFound => write!(f, "not found"),
            DeletionAction::Failed => write!(f, "failed"),
        }
    }
}

/// Audit record for one deletion request.
#[derive(Debug, Clone, Serialize)]
pub struct DeletionOutcome {
    /// The request's resolution key, as given.
    pub key: String,
    pub action: DeletionAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DeletionOutcome {
    fn deleted(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: DeletionAction::Deleted,
            reason: None,
        }
    }

    fn not_found(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: DeletionAction::NotFound,
            reason: None,
        }
    }

    fn failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: DeletionAction::Failed,
            reason: Some(reason.into()),
        }
    }
}

/// Deletion engine over the same pair of target-store collaborators the
/// migration engine writes through.
pub struct DeletionEngine<I, D> {
    identity: I,
    documents: D,
}

impl<I: IdentityStore, D: DocumentStore> DeletionEngine<I, D> {
    pub fn new(identity: I, documents: D) -> Self {
        Self {
            identity,
            documents,
        }
    }

    /// Execute one deletion request to a terminal outcome.
    ///
    /// A resolution miss is `NotFound`, not a failure; store-level errors
    /// during the deletion itself are `Failed` with the store's reason.
    pub async fn delete(&self, request: &DeletionRequest) -> DeletionOutcome {
        let key = request.key.to_string();

        let uid = match &request.key {
            DeletionKey::TargetUid(uid) => uid.clone(),
            DeletionKey::Email(email) => match self.identity.find_uid_by_email(email).await {
                Ok(Some(uid)) => uid,
                Ok(None) => {
                    warn!(email = %email, "no identity entry for email");
                    return DeletionOutcome::not_found(key);
                }
                Err(err) => {
                    error!(email = %email, %err, "identity lookup failed");
                    return DeletionOutcome::failed(key, err.to_string());
                }
            },
        };

        match request.mode {
            DeletionMode::IdentityOnly => self.delete_identity(&key, &uid).await,
            DeletionMode::DocumentOnly => self.delete_document(&key, &uid).await,
            DeletionMode::IdentityAndDocument => {
                let document_removed = match self.documents.delete(&uid).await {
                    Ok(()) => true,
                    Err(err) if err.is_not_found() => false,
                    Err(err) => {
                        error!(uid = %uid, %err, "document delete failed");
                        return DeletionOutcome::failed(key, err.to_string());
                    }
                };
                match self.identity.delete(&uid).await {
                    Ok(()) => {
                        info!(uid = %uid, "identity and document deleted");
                        DeletionOutcome::deleted(key)
                    }
                    Err(err) if err.is_not_found() => {
                        if document_removed {
                            DeletionOutcome::deleted(key)
                        } else {
                            DeletionOutcome::not_found(key)
                        }
                    }
                    Err(err) => {
                        error!(uid = %uid, %err, "identity delete failed");
                        DeletionOutcome::failed(key, err.to_string())
                    }
                }
            }
        }
    }

    /// Delete every migrated entry in the stores the mode selects.
    ///
    /// Both listings are taken before anything is deleted, so an
    /// enumeration failure aborts the sweep with no partial work.
    /// Per-entry failures are recorded and do not stop the sweep.
    pub async fn delete_all(&self, mode: DeletionMode) -> StoreResult<Vec<DeletionOutcome>> {
        let document_ids = match mode {
            DeletionMode::DocumentOnly | DeletionMode::IdentityAndDocument => {
                self.documents.list_ids().await?
            }
            DeletionMode::IdentityOnly => Vec::new(),
        };
        let identity_uids = match mode {
            DeletionMode::IdentityOnly | DeletionMode::IdentityAndDocument => {
                self.identity.list_uids().await?
            }
            DeletionMode::DocumentOnly => Vec::new(),
        };

        let mut outcomes = Vec::with_capacity(document_ids.len() + identity_uids.len());
        for id in document_ids {
            let request = DeletionRequest {
                key: DeletionKey::TargetUid(id),
                mode: DeletionMode::DocumentOnly,
            };
            outcomes.push(self.delete(&request).await);
        }
        for uid in identity_uids {
            let request = DeletionRequest {
                key: DeletionKey::TargetUid(uid),
                mode: DeletionMode::IdentityOnly,
            };
            outcomes.push(self.delete(&request).await);
        }
        Ok(outcomes)
    }

    async fn delete_identity(&self, key: &str, uid: &str) -> DeletionOutcome {
        match self.identity.delete(uid).await {
            Ok(()) => {
                info!(uid = %uid, "identity entry deleted");
                DeletionOutcome::deleted(key)
            }
            Err(err) if err.is_not_found() => DeletionOutcome::not_found(key),
            Err(err) => {
                error!(uid = %uid, %err, "identity delete failed");
                DeletionOutcome::failed(key, err.to_string())
            }
        }
    }

    async fn delete_document(&self, key: &str, uid: &str) -> DeletionOutcome {
        match self.documents.delete(uid).await {
            Ok(()) => {
                info!(uid = %uid, "document deleted");
                DeletionOutcome::deleted(key)
            }
            Err(err) if err.is_not_found() => DeletionOutcome::not_found(key),
            Err(err) => {
                error!(uid = %uid, %err, "document delete failed");
                DeletionOutcome::failed(key, err.to_string())
            }
        }
    }
}
