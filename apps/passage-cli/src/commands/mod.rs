//! CLI command implementations

pub mod delete;
pub mod migrate;

use clap::Args;
use passage_firebase::{FirebaseAuthClient, FirebaseConfig, FirestoreClient};

use crate::error::CliResult;

/// Connection arguments shared by every subcommand.
#[derive(Args, Debug)]
pub struct FirebaseArgs {
    /// Google Cloud project holding the target Firebase stores
    #[arg(long, env = "PASSAGE_PROJECT_ID")]
    pub project_id: String,

    /// OAuth2 bearer token with access to Firebase Auth and Firestore
    #[arg(long, env = "PASSAGE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Firestore collection holding the migrated user documents
    #[arg(long, env = "PASSAGE_COLLECTION", default_value = "users")]
    pub collection: String,

    /// Identity Toolkit API base URL override
    #[arg(long, env = "PASSAGE_AUTH_URL", hide = true)]
    pub auth_url: Option<String>,

    /// Firestore API base URL override
    #[arg(long, env = "PASSAGE_FIRESTORE_URL", hide = true)]
    pub firestore_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,
}

impl FirebaseArgs {
    fn config(&self) -> FirebaseConfig {
        let mut config = FirebaseConfig::new(&self.project_id, &self.access_token)
            .with_collection(&self.collection)
            .with_timeout_secs(self.timeout_secs);
        if let Some(url) = &self.auth_url {
            config = config.with_auth_base_url(url);
        }
        if let Some(url) = &self.firestore_url {
            config = config.with_firestore_base_url(url);
        }
        config
    }

    /// Build both store clients from the shared configuration.
    pub fn clients(&self) -> CliResult<(FirebaseAuthClient, FirestoreClient)> {
        let config = self.config();
        let auth = FirebaseAuthClient::new(config.clone())?;
        let firestore = FirestoreClient::new(config)?;
        Ok((auth, firestore))
    }
}
