//! Record normalization.
//!
//! Reduces the export's ordered attribute list to a flat mapping and
//! derives the identity fields the target stores consume. The attribute
//! list can contain duplicate names; the reduction is last-occurrence-wins.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::record::SourceUserRecord;

/// Why a record was skipped instead of migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// No usable email attribute. The target identity store requires an
    /// email credential; a phone number alone is never sufficient.
    #[error("missing email")]
    MissingEmail,

    /// The record's status is not CONFIRMED and the run is configured to
    /// migrate confirmed accounts only.
    #[error("status not CONFIRMED")]
    NotConfirmed,
}

/// A source record reduced to the fields the target stores consume.
///
/// `email` is mandatory by construction: a record without one never
/// normalizes, so the migration engine cannot see an email-less user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUser {
    pub email: String,
    pub email_verified: bool,
    pub phone: Option<String>,
    pub phone_verified: bool,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    /// Stable source identifier: the `sub` attribute when present and
    /// non-empty, else the export username.
    pub source_id: String,
    /// The full original attribute mapping, retained for document storage.
    pub raw_attributes: BTreeMap<String, String>,
}

impl NormalizedUser {
    /// Display name derived from the name attributes, `None` when both are
    /// absent.
    pub fn display_name(&self) -> Option<String> {
        match (&self.given_name, &self.family_name) {
            (Some(given), Some(family)) => Some(format!("{given} {family}")),
            (Some(given), None) => Some(given.clone()),
            (None, Some(family)) => Some(family.clone()),
            (None, None) => None,
        }
    }
}

/// Stable source identifier for a record, usable even when normalization
/// fails: last non-empty `sub` attribute, else the export username.
pub fn source_id(record: &SourceUserRecord) -> String {
    record
        .attributes
        .iter()
        .rev()
        .find(|a| a.name == "sub" && !a.value.is_empty())
        .map(|a| a.value.clone())
        .unwrap_or_else(|| record.username.clone())
}

/// Normalize one source record, or signal that it must be skipped.
pub fn normalize(record: &SourceUserRecord) -> Result<NormalizedUser, SkipReason> {
    let mut raw = BTreeMap::new();
    for attr in &record.attributes {
        // Last occurrence wins on duplicate names.
        raw.insert(attr.name.clone(), attr.value.clone());
    }

    let email = non_empty(&raw, "email").ok_or(SkipReason::MissingEmail)?;

    Ok(NormalizedUser {
        email,
        email_verified: flag(&raw, "email_verified"),
        phone: non_empty(&raw, "phone_number"),
        phone_verified: flag(&raw, "phone_number_verified"),
        given_name: non_empty(&raw, "given_name"),
        family_name: non_empty(&raw, "family_name"),
        source_id: source_id(record),
        raw_attributes: raw,
    })
}

fn non_empty(attributes: &BTreeMap<String, String>, name: &str) -> Option<String> {
    attributes.get(name).filter(|v| !v.is_empty()).cloned()
}

/// A verification flag is true only when its value equals "true",
/// case-insensitively.
fn flag(attributes: &BTreeMap<String, String>, name: &str) -> bool {
    attributes
        .get(name)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}
