//! Client directory wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Gender options offered on the client profile form.
///
/// The wire form is the kebab-case identifier (`non-binary`, `prefer-not-to-say`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
    PreferNotToSay,
    Other,
}

impl Gender {
    /// All options, in the order the form presents them.
    pub const ALL: [Gender; 5] = [
        Gender::Female,
        Gender::Male,
        Gender::NonBinary,
        Gender::PreferNotToSay,
        Gender::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::NonBinary => "non-binary",
            Gender::PreferNotToSay => "prefer-not-to-say",
            Gender::Other => "other",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
            Gender::NonBinary => "Non-binary",
            Gender::PreferNotToSay => "Prefer not to say",
            Gender::Other => "Other...",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Gender must be one of: female, male, non-binary, prefer-not-to-say, other")]
pub struct GenderParseError;

impl FromStr for Gender {
    type Err = GenderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or(GenderParseError)
    }
}

/// A client record as held by the directory service.
///
/// The service is authoritative for `id`, `uuid` and both timestamps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClientRecord {
    pub id: u64,
    /// Canonical 32-character lowercase hex UUID.
    pub uuid: String,
    pub full_name: String,
    pub age: u8,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for creating a client or replacing a client's editable fields.
///
/// `age` is deliberately wider than the stored type so out-of-range values reach validation
/// instead of failing JSON decoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClientPayload {
    pub full_name: String,
    pub age: i64,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// Roster entry returned by the list endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClientSummary {
    pub id: u64,
    pub uuid: String,
    pub full_name: String,
    pub age: u8,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
}

impl From<&ClientRecord> for ClientSummary {
    fn from(record: &ClientRecord) -> Self {
        Self {
            id: record.id,
            uuid: record.uuid.clone(),
            full_name: record.full_name.clone(),
            age: record.age,
            gender: record.gender,
            created_at: record.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClientCountRes {
    pub total_clients: u64,
}

/// Error body returned by every failing endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ErrorRes {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            error_code: None,
        }
    }
}

/// Banner returned from the service root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfoRes {
    pub message: String,
    pub version: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_uses_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&Gender::PreferNotToSay).unwrap();
        assert_eq!(json, "\"prefer-not-to-say\"");

        let parsed: Gender = serde_json::from_str("\"non-binary\"").unwrap();
        assert_eq!(parsed, Gender::NonBinary);
    }

    #[test]
    fn gender_from_str_matches_wire_names() {
        for gender in Gender::ALL {
            assert_eq!(gender.as_str().parse::<Gender>(), Ok(gender));
        }
        assert_eq!("Female".parse::<Gender>(), Err(GenderParseError));
        assert_eq!("".parse::<Gender>(), Err(GenderParseError));
    }

    #[test]
    fn payload_omits_absent_optional_fields() {
        let payload = ClientPayload {
            full_name: "Al".into(),
            age: 120,
            gender: Gender::Male,
            custom_gender: None,
            background: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        let obj = value.as_object().unwrap();

        assert!(!obj.contains_key("custom_gender"));
        assert!(!obj.contains_key("background"));
        assert_eq!(obj["gender"], "male");
    }

    #[test]
    fn payload_accepts_missing_optional_fields() {
        let payload: ClientPayload =
            serde_json::from_str(r#"{"full_name":"Jordan","age":150,"gender":"other"}"#).unwrap();
        assert_eq!(payload.age, 150);
        assert_eq!(payload.custom_gender, None);
    }
}
