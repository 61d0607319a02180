//! Firebase Authentication client (Identity Toolkit v1 REST).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use passage_core::{IdentityStore, IdentityWrite, StoreError, StoreResult};

use crate::config::FirebaseConfig;

/// Page size for identity listing requests.
const BATCH_GET_PAGE_SIZE: u32 = 500;

/// Identity store backed by the Firebase Authentication REST API.
pub struct FirebaseAuthClient {
    config: FirebaseConfig,
    client: Client,
}

impl std::fmt::Debug for FirebaseAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseAuthClient")
            .field("config", &self.config.redacted())
            .finish()
    }
}

impl FirebaseAuthClient {
    pub fn new(config: FirebaseConfig) -> StoreResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// URL for a project-scoped accounts operation, e.g. `:lookup`.
    fn accounts_url(&self, op: &str) -> String {
        format!(
            "{}/projects/{}/accounts{op}",
            self.config.auth_base_url.trim_end_matches('/'),
            self.config.project_id
        )
    }

    async fn post(&self, url: &str, body: Value) -> StoreResult<Value> {
        debug!(%url, "auth request");
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::network(e.to_string()))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::invalid_response(e.to_string()))?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(classify_error(status.as_u16(), &body))
        }
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> StoreResult<Value> {
        debug!(%url, "auth request");
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| StoreError::network(e.to_string()))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::invalid_response(e.to_string()))?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(classify_error(status.as_u16(), &body))
        }
    }
}

/// Map an Identity Toolkit error body to the store error taxonomy.
///
/// The API reports machine-readable codes in `error.message`, sometimes
/// with a trailing ` : detail` suffix.
fn classify_error(status: u16, body: &Value) -> StoreError {
    let message = body
        .pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let code = message.split(&[' ', ':'][..]).next().unwrap_or("");
    match code {
        "PHONE_NUMBER_EXISTS" | "INVALID_PHONE_NUMBER" => StoreError::phone_conflict(message),
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => StoreError::not_found(message),
        _ => StoreError::api("auth", status, message),
    }
}

/// Request body for a create or update write.
fn write_body(fields: &IdentityWrite, local_id: Option<&str>) -> Value {
    let mut body = Map::new();
    if let Some(uid) = local_id.map(str::to_string).or_else(|| fields.uid.clone()) {
        body.insert("localId".to_string(), json!(uid));
    }
    body.insert("email".to_string(), json!(fields.email));
    body.insert("emailVerified".to_string(), json!(fields.email_verified));
    if let Some(password) = &fields.password {
        body.insert("password".to_string(), json!(password));
    }
    if let Some(phone) = &fields.phone {
        body.insert("phoneNumber".to_string(), json!(phone));
        body.insert("phoneVerified".to_string(), json!(fields.phone_verified));
    }
    if let Some(name) = &fields.display_name {
        body.insert("displayName".to_string(), json!(name));
    }
    body.insert("disabled".to_string(), json!(fields.disabled));
    Value::Object(body)
}

#[async_trait]
impl IdentityStore for FirebaseAuthClient {
    async fn find_uid_by_email(&self, email: &str) -> StoreResult<Option<String>> {
        let url = self.accounts_url(":lookup");
        let result = self.post(&url, json!({ "email": [email] })).await;
        match result {
            Ok(body) => {
                let uid = body
                    .pointer("/users/0/localId")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Ok(uid)
            }
            // The API signals a miss either with an empty body or with an
            // explicit not-found code, depending on credential type.
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn create(&self, fields: &IdentityWrite) -> StoreResult<String> {
        let url = self.accounts_url("");
        let body = self.post(&url, write_body(fields, None)).await?;
        body.get("localId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::invalid_response("create response carried no localId"))
    }

    async fn update(&self, uid: &str, fields: &IdentityWrite) -> StoreResult<()> {
        let url = self.accounts_url(":update");
        self.post(&url, write_body(fields, Some(uid))).await?;
        Ok(())
    }

    async fn delete(&self, uid: &str) -> StoreResult<()> {
        let url = self.accounts_url(":delete");
        self.post(&url, json!({ "localId": uid })).await?;
        Ok(())
    }

    async fn list_uids(&self) -> StoreResult<Vec<String>> {
        let url = self.accounts_url(":batchGet");
        let mut uids = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![("maxResults", BATCH_GET_PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("nextPageToken", token.clone()));
            }
            let body = self.get(&url, &query).await?;
            if let Some(users) = body.get("users").and_then(Value::as_array) {
                uids.extend(
                    users
                        .iter()
                        .filter_map(|u| u.get("localId").and_then(Value::as_str))
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
        Ok(uids)
    }

    async fn password_reset_link(&self, email: &str) -> StoreResult<String> {
        let url = format!(
            "{}/accounts:sendOobCode",
            self.config.auth_base_url.trim_end_matches('/')
        );
        let body = self
            .post(
                &url,
                json!({
                    "requestType": "PASSWORD_RESET",
                    "email": email,
                    "returnOobLink": true,
                }),
            )
            .await?;
        body.get("oobLink")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                warn!(%email, "sendOobCode response carried no oobLink");
                StoreError::invalid_response("sendOobCode response carried no oobLink")
            })
    }
}
