//! Store collaborator error taxonomy.
//!
//! Error classification drives the engine: phone conflicts trigger the
//! single no-phone retry, not-found signals drive create-vs-update and
//! deletion outcomes, and everything else fails the record it occurred on
//! without touching the rest of the batch.

use thiserror::Error;

/// Error returned by a target identity-store or document-store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed entry does not exist in the target store.
    #[error("not found: {0}")]
    NotFound(String),

    /// The phone number was rejected as invalid or is already claimed by
    /// another identity entry.
    #[error("phone number conflict: {0}")]
    PhoneConflict(String),

    /// The target store rejected the request.
    #[error("{store} error (status {status}): {message}")]
    Api {
        store: &'static str,
        status: u16,
        message: String,
    },

    /// The request never produced a usable response.
    #[error("network error: {0}")]
    Network(String),

    /// The response arrived but could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The collaborator was configured in a way it cannot operate with.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Whether this is the store's "no such entry" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Whether this is a phone-number conflict eligible for the no-phone
    /// retry.
    pub fn is_phone_conflict(&self) -> bool {
        matches!(self, StoreError::PhoneConflict(_))
    }

    // Convenience constructors

    pub fn not_found(identifier: impl Into<String>) -> Self {
        StoreError::NotFound(identifier.into())
    }

    pub fn phone_conflict(message: impl Into<String>) -> Self {
        StoreError::PhoneConflict(message.into())
    }

    pub fn api(store: &'static str, status: u16, message: impl Into<String>) -> Self {
        StoreError::Api {
            store,
            status,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        StoreError::Network(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        StoreError::InvalidResponse(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        StoreError::Configuration(message.into())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
