//! The user document written to the target document store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedUser;
use crate::record::SourceUserRecord;

/// Full attribute record stored per migrated user.
///
/// Carries every original source attribute verbatim alongside the derived
/// fields, so nothing from the export is lost even where the identity
/// store has no native slot for it. Written as a full overwrite keyed by
/// the identity key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    pub username: String,
    /// The complete source attribute mapping, last-occurrence-wins.
    pub attributes: BTreeMap<String, String>,
    pub email: String,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub phone_number_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    pub source_id: String,
    pub user_create_date: String,
    pub user_last_modified_date: String,
    pub enabled: bool,
    pub user_status: String,
    /// Identity key assigned by the target identity store.
    pub firebase_uid: String,
    pub migrated_at: DateTime<Utc>,
}

impl UserDocument {
    /// Assemble the document for one migrated user.
    pub fn assemble(
        record: &SourceUserRecord,
        user: &NormalizedUser,
        uid: &str,
        migrated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            username: record.username.clone(),
            attributes: user.raw_attributes.clone(),
            email: user.email.clone(),
            email_verified: user.email_verified,
            phone_number: user.phone.clone(),
            phone_number_verified: user.phone_verified,
            given_name: user.given_name.clone(),
            family_name: user.family_name.clone(),
            source_id: user.source_id.clone(),
            user_create_date: record.created_at.clone(),
            user_last_modified_date: record.last_modified_at.clone(),
            enabled: record.enabled,
            user_status: record.status.clone(),
            firebase_uid: uid.to_string(),
            migrated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::record::SourceAttribute;

    fn record() -> SourceUserRecord {
        SourceUserRecord {
            username: "jane".to_string(),
            attributes: vec![
                SourceAttribute {
                    name: "email".to_string(),
                    value: "jane@example.com".to_string(),
                },
                SourceAttribute {
                    name: "phone_number".to_string(),
                    value: "+15550001111".to_string(),
                },
                SourceAttribute {
                    name: "custom_flag".to_string(),
                    value: "z".to_string(),
                },
            ],
            created_at: "2023-01-15T10:00:00Z".to_string(),
            last_modified_at: "2023-06-01T08:30:00Z".to_string(),
            enabled: false,
            status: "CONFIRMED".to_string(),
        }
    }

    #[test]
    fn every_source_attribute_survives_assembly() {
        let rec = record();
        let user = normalize(&rec).unwrap();
        let doc = UserDocument::assemble(&rec, &user, "uid-1", Utc::now());

        assert_eq!(doc.attributes.get("custom_flag").map(String::as_str), Some("z"));
        assert_eq!(
            doc.attributes.get("phone_number").map(String::as_str),
            Some("+15550001111")
        );
        assert_eq!(doc.firebase_uid, "uid-1");
        assert_eq!(doc.user_create_date, "2023-01-15T10:00:00Z");
        assert!(!doc.enabled);
    }

    #[test]
    fn assembly_is_deterministic_modulo_timestamp() {
        let rec = record();
        let user = normalize(&rec).unwrap();
        let at = Utc::now();
        assert_eq!(
            UserDocument::assemble(&rec, &user, "uid-1", at),
            UserDocument::assemble(&rec, &user, "uid-1", at)
        );
    }
}
