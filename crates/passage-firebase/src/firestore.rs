//! Firestore document store client (Firestore v1 REST).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use passage_core::{DocumentStore, StoreError, StoreResult, UserDocument};

use crate::config::FirebaseConfig;
use crate::values;

/// Page size for document listing requests.
const LIST_PAGE_SIZE: u32 = 300;

/// Document store backed by the Firestore REST API. Documents live in a
/// single configured collection, keyed by identity key.
pub struct FirestoreClient {
    config: FirebaseConfig,
    client: Client,
}

impl std::fmt::Debug for FirestoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreClient")
            .field("config", &self.config.redacted())
            .finish()
    }
}

impl FirestoreClient {
    pub fn new(config: FirebaseConfig) -> StoreResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.config.firestore_base_url.trim_end_matches('/'),
            self.config.project_id,
            self.config.collection
        )
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{id}", self.collection_url())
    }

    async fn check(&self, response: reqwest::Response) -> StoreResult<Value> {
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .unwrap_or(Value::Null);
        if status.is_success() {
            Ok(body)
        } else {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            if status.as_u16() == 404 {
                Err(StoreError::not_found(message))
            } else {
                Err(StoreError::api("firestore", status.as_u16(), message))
            }
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn put(&self, uid: &str, document: &UserDocument) -> StoreResult<()> {
        let url = self.document_url(uid);
        debug!(%url, "firestore write");
        let json = serde_json::to_value(document)
            .map_err(|e| StoreError::invalid_response(format!("document encoding: {e}")))?;
        let Value::Object(map) = json else {
            return Err(StoreError::invalid_response(
                "document did not encode as an object",
            ));
        };
        let body = serde_json::json!({ "fields": values::encode_fields(&map) });
        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::network(e.to_string()))?;
        self.check(response).await?;
        Ok(())
    }

    async fn delete(&self, uid: &str) -> StoreResult<()> {
        let url = self.document_url(uid);
        debug!(%url, "firestore delete");
        // Without the exists precondition Firestore treats a delete of a
        // missing document as success; the engines need the miss surfaced.
        let response = self
            .client
            .delete(&url)
            .query(&[("currentDocument.exists", "true")])
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| StoreError::network(e.to_string()))?;
        self.check(response).await?;
        Ok(())
    }

    async fn list_ids(&self) -> StoreResult<Vec<String>> {
        let url = self.collection_url();
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![("pageSize", LIST_PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let response = self
                .client
                .get(&url)
                .query(&query)
                .bearer_auth(&self.config.access_token)
                .send()
                .await
                .map_err(|e| StoreError::network(e.to_string()))?;
            let body = self.check(response).await?;
            if let Some(documents) = body.get("documents").and_then(Value::as_array) {
                // Document names are full resource paths; the id is the
                // final segment.
                ids.extend(
                    documents
                        .iter()
                        .filter_map(|d| d.get("name").and_then(Value::as_str))
                        .filter_map(|name| name.rsplit('/').next())
                        .map(str::to_string),
                );
            }
            page_token = body
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }
        Ok(ids)
    }
}
