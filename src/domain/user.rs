//! User domain model

use crate::error::{DecodeError, DirectoryError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider-neutral user record.
///
/// Absent remote fields are represented by empty strings / `false`, never by
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    /// User principal name (login identifier)
    pub upn: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub office_phone: String,
    pub mobile_phone: String,
    pub company: String,
    pub department: String,
    pub job_title: String,
    pub office_location: String,
    pub enabled: bool,
    pub must_change_password: bool,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sign_in: Option<DateTime<Utc>>,
    pub attributes: AttributeState,
}

impl User {
    pub fn new(upn: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            upn: upn.into(),
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    /// Custom attributes, or the decode failure that prevented reading them.
    pub fn custom_attributes(&self) -> Result<Option<&CustomAttributes>> {
        match &self.attributes {
            AttributeState::Absent => Ok(None),
            AttributeState::Present(attributes) => Ok(Some(attributes)),
            AttributeState::Malformed(err) => Err(DirectoryError::Decode(err.clone())),
        }
    }

    pub fn set_custom_attributes(&mut self, attributes: CustomAttributes) {
        self.attributes = if attributes.is_empty() {
            AttributeState::Absent
        } else {
            AttributeState::Present(attributes)
        };
    }

    /// Local part of the UPN, used as the mail nickname.
    pub fn mail_nickname(&self) -> &str {
        self.upn.split('@').next().unwrap_or_default()
    }
}

/// Organisation-specific attributes kept alongside the standard profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CustomAttributes {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub account_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub citizenship: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub contract_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub contract_expiration_date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub justification: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub program_role: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sponsor: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status_reason: String,
}

impl CustomAttributes {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// What was found in the custom attribute slot of a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum AttributeState {
    #[default]
    Absent,
    Present(CustomAttributes),
    Malformed(DecodeError),
}
