//! Microsoft Graph wire representations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ODATA_TYPE_USER: &str = "#microsoft.graph.user";
pub const ODATA_TYPE_GROUP: &str = "#microsoft.graph.group";

/// Graph user resource. Every property is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphUser {
    #[serde(rename = "@odata.type", skip_serializing)]
    pub odata_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_principal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_phones: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_location: Option<String>,
    /// Carries the encoded custom attributes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_profile: Option<PasswordProfile>,
    #[serde(skip_serializing)]
    pub sign_in_activity: Option<SignInActivity>,
    #[serde(skip_serializing)]
    pub assigned_licenses: Option<Vec<AssignedLicense>>,
}

impl GraphUser {
    /// Directory objects from membership endpoints may be users or something else.
    pub fn is_user(&self) -> bool {
        self.odata_type
            .as_deref()
            .map_or(true, |t| t.eq_ignore_ascii_case(ODATA_TYPE_USER))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_change_password_next_sign_in: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInActivity {
    pub last_sign_in_date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedLicense {
    pub sku_id: Uuid,
    #[serde(default)]
    pub disabled_plans: Vec<Uuid>,
}

/// Certificate bindings used for certificate-based authentication
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorizationInfo {
    pub certificate_user_ids: Vec<String>,
}

/// A user read with `$select=authorizationInfo`, also the PATCH body that
/// touches only that property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserAuthorization {
    pub authorization_info: AuthorizationInfo,
}

/// Graph group resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphGroup {
    #[serde(rename = "@odata.type", skip_serializing)]
    pub odata_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_enabled: Option<bool>,
}

impl GraphGroup {
    pub fn is_group(&self) -> bool {
        self.odata_type
            .as_deref()
            .map_or(true, |t| t.eq_ignore_ascii_case(ODATA_TYPE_GROUP))
    }
}

/// Entry of `/subscribedSkus`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedSku {
    pub id: String,
    pub sku_id: Uuid,
    #[serde(default)]
    pub sku_part_number: Option<String>,
    #[serde(default)]
    pub consumed_units: Option<i64>,
    #[serde(default)]
    pub prepaid_units: Option<LicenseUnits>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseUnits {
    #[serde(default)]
    pub enabled: Option<i64>,
}

/// Body of `POST /users/{id}/assignLicense`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignLicenseBody {
    pub add_licenses: Vec<AssignedLicense>,
    pub remove_licenses: Vec<Uuid>,
}

/// Body of `POST /invitations`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationBody {
    pub invited_user_email_address: String,
    pub invited_user_display_name: String,
    pub invite_redirect_url: String,
    pub send_invitation_message: bool,
}

/// Body of `POST /groups/{id}/members/$ref`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceCreate {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

/// Collection response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// Graph error envelope: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ODataErrorResponse {
    pub error: ODataError,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ODataError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Identity platform token endpoint error
#[derive(Debug, Clone, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}
