//! Target store collaborator traits.
//!
//! The engines talk to the destination systems through these traits so the
//! decision logic can be exercised against recording fakes. `Ok(None)` from
//! the email lookup is the store's own "no such entry" signal; transport
//! and API failures come back as errors and are never read as a miss.

use async_trait::async_trait;

use crate::document::UserDocument;
use crate::error::StoreResult;

/// Fields written to the target identity store for one user.
///
/// One shape serves both create and update; create-only fields are ignored
/// by update implementations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityWrite {
    /// Requested identity key, honored on create where the store allows a
    /// caller-chosen key. The key returned by the store stays authoritative.
    pub uid: Option<String>,
    pub email: String,
    pub email_verified: bool,
    /// Initial password, set on create only.
    pub password: Option<String>,
    pub phone: Option<String>,
    pub phone_verified: bool,
    pub display_name: Option<String>,
    pub disabled: bool,
}

impl IdentityWrite {
    /// The same write with the phone fields omitted entirely.
    #[must_use]
    pub fn without_phone(mut self) -> Self {
        self.phone = None;
        self.phone_verified = false;
        self
    }
}

/// The destination authentication system.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up the identity key for an email address.
    ///
    /// `Ok(None)` means the store reported no such user; any error means
    /// the lookup itself failed.
    async fn find_uid_by_email(&self, email: &str) -> StoreResult<Option<String>>;

    /// Create a new identity entry, returning the assigned identity key.
    async fn create(&self, fields: &IdentityWrite) -> StoreResult<String>;

    /// Overwrite the fields of an existing identity entry.
    async fn update(&self, uid: &str, fields: &IdentityWrite) -> StoreResult<()>;

    /// Remove an identity entry.
    async fn delete(&self, uid: &str) -> StoreResult<()>;

    /// Enumerate every identity key in the store.
    async fn list_uids(&self) -> StoreResult<Vec<String>>;

    /// Generate a password-reset link for the given email.
    async fn password_reset_link(&self, email: &str) -> StoreResult<String>;
}

/// The destination structured-data store, keyed by identity key.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write the user document, replacing any existing content under the
    /// key. Idempotent: re-running a migration converges on the same
    /// document.
    async fn put(&self, uid: &str, document: &UserDocument) -> StoreResult<()>;

    /// Remove the document under the key.
    async fn delete(&self, uid: &str) -> StoreResult<()>;

    /// Enumerate every document key in the store.
    async fn list_ids(&self) -> StoreResult<Vec<String>>;
}

// Shared handles delegate, so one client instance can serve both engines.

#[async_trait]
impl<T: IdentityStore + ?Sized> IdentityStore for std::sync::Arc<T> {
    async fn find_uid_by_email(&self, email: &str) -> StoreResult<Option<String>> {
        (**self).find_uid_by_email(email).await
    }

    async fn create(&self, fields: &IdentityWrite) -> StoreResult<String> {
        (**self).create(fields).await
    }

    async fn update(&self, uid: &str, fields: &IdentityWrite) -> StoreResult<()> {
        (**self).update(uid, fields).await
    }

    async fn delete(&self, uid: &str) -> StoreResult<()> {
        (**self).delete(uid).await
    }

    async fn list_uids(&self) -> StoreResult<Vec<String>> {
        (**self).list_uids().await
    }

    async fn password_reset_link(&self, email: &str) -> StoreResult<String> {
        (**self).password_reset_link(email).await
    }
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<T> {
    async fn put(&self, uid: &str, document: &UserDocument) -> StoreResult<()> {
        (**self).put(uid, document).await
    }

    async fn delete(&self, uid: &str) -> StoreResult<()> {
        (**self).delete(uid).await
    }

    async fn list_ids(&self) -> StoreResult<Vec<String>> {
        (**self).list_ids().await
    }
}
