//! Source records as read from the identity-provider export file.

use serde::Deserialize;

/// A source export document: a top-level `Users` array.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceExport {
    #[serde(rename = "Users", default)]
    pub users: Vec<SourceUserRecord>,
}

/// One user record as exported from the source identity provider.
///
/// Timestamps are carried through as the export's ISO-8601 strings,
/// unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceUserRecord {
    #[serde(rename = "Username")]
    pub username: String,

    /// Ordered attribute pairs. Names may repeat in pathological exports;
    /// normalization reduces them to a mapping with last-occurrence-wins.
    #[serde(rename = "Attributes", default)]
    pub attributes: Vec<SourceAttribute>,

    #[serde(rename = "UserCreateDate", default)]
    pub created_at: String,

    #[serde(rename = "UserLastModifiedDate", default)]
    pub last_modified_at: String,

    #[serde(rename = "Enabled", default = "enabled_default")]
    pub enabled: bool,

    #[serde(rename = "UserStatus", default)]
    pub status: String,
}

/// A single `{Name, Value}` attribute pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceAttribute {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: String,
}

fn enabled_default() -> bool {
    true
}
