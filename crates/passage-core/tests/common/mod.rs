//! Recording in-memory fakes for the target-store collaborators.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use passage_core::{
    DocumentStore, IdentityStore, IdentityWrite, StoreError, StoreResult, UserDocument,
};

/// In-memory identity store that records every call and can inject
/// targeted failures.
#[derive(Default)]
pub struct FakeIdentityStore {
    /// Pre-existing entries, email -> uid. `create` inserts here.
    pub users: Mutex<BTreeMap<String, String>>,
    /// Uids with deletable entries.
    pub uids: Mutex<Vec<String>>,
    /// Every call in order, as `op` or `op:arg`.
    pub calls: Mutex<Vec<String>>,
    /// Every write attempted, in order.
    pub writes: Mutex<Vec<IdentityWrite>>,
    /// Writes carrying a phone number fail with a phone conflict.
    pub reject_phone: bool,
    /// Writes without a rejected phone fail with this API error message.
    pub fail_writes: Option<&'static str>,
    pub fail_lookup: bool,
    pub fail_reset_link: bool,
    pub fail_delete: Option<&'static str>,
    pub fail_list: bool,
}

impl FakeIdentityStore {
    pub fn with_existing_user(email: &str, uid: &str) -> Self {
        let store = Self::default();
        store
            .users
            .lock()
            .unwrap()
            .insert(email.to_string(), uid.to_string());
        store.uids.lock().unwrap().push(uid.to_string());
        store
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<IdentityWrite> {
        self.writes.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IdentityStore for FakeIdentityStore {
    async fn find_uid_by_email(&self, email: &str) -> StoreResult<Option<String>> {
        self.record(format!("lookup:{email}"));
        if self.fail_lookup {
            return Err(StoreError::api("auth", 503, "backend unavailable"));
        }
        Ok(self.users.lock().unwrap().get(email).cloned())
    }

    async fn create(&self, fields: &IdentityWrite) -> StoreResult<String> {
        self.record("create".to_string());
        self.writes.lock().unwrap().push(fields.clone());
        if self.reject_phone && fields.phone.is_some() {
            return Err(StoreError::phone_conflict("PHONE_NUMBER_EXISTS"));
        }
        if let Some(message) = self.fail_writes {
            return Err(StoreError::api("auth", 500, message));
        }
        let uid = fields
            .uid
            .clone()
            .unwrap_or_else(|| format!("gen-{}", self.users.lock().unwrap().len()));
        self.users
            .lock()
            .unwrap()
            .insert(fields.email.clone(), uid.clone());
        self.uids.lock().unwrap().push(uid.clone());
        Ok(uid)
    }

    async fn update(&self, uid: &str, fields: &IdentityWrite) -> StoreResult<()> {
        self.record(format!("update:{uid}"));
        self.writes.lock().unwrap().push(fields.clone());
        if self.reject_phone && fields.phone.is_some() {
            return Err(StoreError::phone_conflict("INVALID_PHONE_NUMBER"));
        }
        if let Some(message) = self.fail_writes {
            return Err(StoreError::api("auth", 500, message));
        }
        Ok(())
    }

    async fn delete(&self, uid: &str) -> StoreResult<()> {
        self.record(format!("delete:{uid}"));
        if let Some(message) = self.fail_delete {
            return Err(StoreError::api("auth", 500, message));
        }
        let mut uids = self.uids.lock().unwrap();
        match uids.iter().position(|u| u == uid) {
            Some(index) => {
                uids.remove(index);
                Ok(())
            }
            None => Err(StoreError::not_found(uid)),
        }
    }

    async fn list_uids(&self) -> StoreResult<Vec<String>> {
        self.record("list".to_string());
        if self.fail_list {
            return Err(StoreError::api("auth", 503, "backend unavailable"));
        }
        Ok(self.uids.lock().unwrap().clone())
    }

    async fn password_reset_link(&self, email: &str) -> StoreResult<String> {
        self.record(format!("reset_link:{email}"));
        if self.fail_reset_link {
            return Err(StoreError::api("auth", 400, "RESET_PASSWORD_EXCEED_LIMIT"));
        }
        Ok(format!("https://auth.example/reset?email={email}"))
    }
}

/// In-memory document store with the same recording surface.
#[derive(Default)]
pub struct FakeDocumentStore {
    pub documents: Mutex<BTreeMap<String, UserDocument>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_put: bool,
    pub fail_delete: Option<&'static str>,
    pub fail_list: bool,
}

impl FakeDocumentStore {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn document(&self, uid: &str) -> Option<UserDocument> {
        self.documents.lock().unwrap().get(uid).cloned()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DocumentStore for FakeDocumentStore {
    async fn put(&self, uid: &str, document: &UserDocument) -> StoreResult<()> {
        self.record(format!("put:{uid}"));
        if self.fail_put {
            return Err(StoreError::api("firestore", 500, "internal"));
        }
        self.documents
            .lock()
            .unwrap()
            .insert(uid.to_string(), document.clone());
        Ok(())
    }

    async fn delete(&self, uid: &str) -> StoreResult<()> {
        self.record(format!("delete:{uid}"));
        if let Some(message) = self.fail_delete {
            return Err(StoreError::api("firestore", 500, message));
        }
        match self.documents.lock().unwrap().remove(uid) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(uid)),
        }
    }

    async fn list_ids(&self) -> StoreResult<Vec<String>> {
        self.record("list".to_string());
        if self.fail_list {
            return Err(StoreError::api("firestore", 503, "backend unavailable"));
        }
        Ok(self.documents.lock().unwrap().keys().cloned().collect())
    }
}

/// Seed document for deletion tests.
pub fn sample_document(uid: &str) -> UserDocument {
    let email = format!("{uid}@example.com");
    let record = record_with(uid, &[("email", email.as_str())]);
    let user = passage_core::normalize(&record).unwrap();
    UserDocument::assemble(&record, &user, uid, chrono::Utc::now())
}

/// Build a source record from `(name, value)` attribute pairs.
pub fn record_with(username: &str, attrs: &[(&str, &str)]) -> passage_core::SourceUserRecord {
    passage_core::SourceUserRecord {
        username: username.to_string(),
        attributes: attrs
            .iter()
            .map(|(name, value)| passage_core::SourceAttribute {
                name: (*name).to_string(),
                value: (*value).to_string(),
            })
            .collect(),
        created_at: "2023-01-15T10:00:00Z".to_string(),
        last_modified_at: "2023-06-01T08:30:00Z".to_string(),
        enabled: true,
        status: "CONFIRMED".to_string(),
    }
}
