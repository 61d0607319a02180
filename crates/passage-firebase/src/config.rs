//! Firebase client configuration.

use passage_core::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

fn default_auth_base_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_firestore_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_collection() -> String {
    "users".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Shared configuration for the Firebase Auth and Firestore clients.
///
/// The base URLs default to the public Google endpoints and are overridable
/// so integration tests can point the clients at a mock server.
#[derive(Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    /// Google Cloud project the target stores live in.
    pub project_id: String,

    /// Pre-obtained OAuth2 bearer token with access to both stores. Token
    /// acquisition is outside this crate.
    pub access_token: String,

    /// Firestore collection holding the migrated user documents.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Identity Toolkit API base URL.
    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,

    /// Firestore API base URL.
    #[serde(default = "default_firestore_base_url")]
    pub firestore_base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl FirebaseConfig {
    pub fn new(project_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            access_token: access_token.into(),
            collection: default_collection(),
            auth_base_url: default_auth_base_url(),
            firestore_base_url: default_firestore_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Override the Identity Toolkit base URL (integration tests).
    pub fn with_auth_base_url(mut self, url: impl Into<String>) -> Self {
        self.auth_base_url = url.into();
        self
    }

    /// Override the Firestore base URL (integration tests).
    pub fn with_firestore_base_url(mut self, url: impl Into<String>) -> Self {
        self.firestore_base_url = url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.project_id.is_empty() {
            return Err(StoreError::configuration("project_id is required"));
        }
        if self.access_token.is_empty() {
            return Err(StoreError::configuration("access_token is required"));
        }
        if self.collection.is_empty() {
            return Err(StoreError::configuration("collection is required"));
        }
        Ok(())
    }

    /// A copy safe to log or debug-print.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.access_token = "***REDACTED***".to_string();
        config
    }
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("project_id", &self.project_id)
            .field("access_token", &"***REDACTED***")
            .field("collection", &self.collection)
            .field("auth_base_url", &self.auth_base_url)
            .field("firestore_base_url", &self.firestore_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
