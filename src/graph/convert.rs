//! Translation between generic records and Graph resources

use super::attributes;
use super::types::{GraphGroup, GraphUser, PasswordProfile, SubscribedSku};
use crate::domain::{AttributeState, Group, License, User};

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Full Graph representation of a user, as sent on create.
pub fn user_to_graph(user: &User) -> GraphUser {
    let password_profile = if user.must_change_password || !user.password.is_empty() {
        Some(PasswordProfile {
            force_change_password_next_sign_in: Some(user.must_change_password),
            password: non_empty(&user.password),
        })
    } else {
        None
    };

    // A malformed blob read from the server is never written back
    let street_address = match &user.attributes {
        AttributeState::Present(attrs) => attributes::encode(attrs),
        AttributeState::Absent | AttributeState::Malformed(_) => None,
    };

    GraphUser {
        odata_type: None,
        id: non_empty(&user.id),
        user_principal_name: Some(user.upn.clone()),
        display_name: Some(user.display_name.clone()),
        given_name: non_empty(&user.first_name),
        surname: non_empty(&user.last_name),
        mail: non_empty(&user.email),
        mail_nickname: non_empty(user.mail_nickname()),
        business_phones: non_empty(&user.office_phone).map(|phone| vec![phone]),
        mobile_phone: non_empty(&user.mobile_phone),
        company_name: non_empty(&user.company),
        department: non_empty(&user.department),
        job_title: non_empty(&user.job_title),
        office_location: non_empty(&user.office_location),
        street_address,
        account_enabled: Some(user.enabled),
        password_profile,
        sign_in_activity: None,
        assigned_licenses: None,
    }
}

/// PATCH body for a profile update.
///
/// Leaves `accountEnabled` alone; enabling and disabling have their own calls.
pub fn user_patch(user: &User) -> GraphUser {
    GraphUser {
        id: None,
        user_principal_name: non_empty(&user.upn),
        display_name: non_empty(&user.display_name),
        account_enabled: None,
        ..user_to_graph(user)
    }
}

/// Map a Graph user back into the generic record.
pub fn user_from_graph(user: GraphUser) -> User {
    let (must_change_password, password) = match user.password_profile {
        Some(profile) => (
            profile.force_change_password_next_sign_in.unwrap_or(false),
            profile.password.unwrap_or_default(),
        ),
        None => (false, String::new()),
    };

    let attributes = attributes::decode(user.street_address.as_deref());

    User {
        id: user.id.unwrap_or_default(),
        upn: user.user_principal_name.unwrap_or_default(),
        display_name: user.display_name.unwrap_or_default(),
        first_name: user.given_name.unwrap_or_default(),
        last_name: user.surname.unwrap_or_default(),
        email: user.mail.unwrap_or_default(),
        office_phone: user
            .business_phones
            .and_then(|phones| phones.into_iter().next())
            .unwrap_or_default(),
        mobile_phone: user.mobile_phone.unwrap_or_default(),
        company: user.company_name.unwrap_or_default(),
        department: user.department.unwrap_or_default(),
        job_title: user.job_title.unwrap_or_default(),
        office_location: user.office_location.unwrap_or_default(),
        enabled: user.account_enabled.unwrap_or(false),
        must_change_password,
        password,
        last_sign_in: user
            .sign_in_activity
            .and_then(|activity| activity.last_sign_in_date_time),
        attributes,
    }
}

/// Prefix every certificate user id carries for principal-name binding
pub const CERTIFICATE_PRINCIPAL_PREFIX: &str = "X509:<PN>";

/// `X509:<PN>` form of a certificate id; ids already in that form pass through.
pub fn certificate_user_id(cert_id: &str) -> String {
    if cert_id.starts_with(CERTIFICATE_PRINCIPAL_PREFIX) {
        cert_id.to_string()
    } else {
        format!("{}{}", CERTIFICATE_PRINCIPAL_PREFIX, cert_id)
    }
}

/// Security group body for creation
pub fn group_to_graph(name: &str) -> GraphGroup {
    GraphGroup {
        odata_type: None,
        id: None,
        display_name: Some(name.to_string()),
        mail_enabled: Some(false),
        mail_nickname: Some(group_mail_nickname(name)),
        security_enabled: Some(true),
    }
}

pub fn group_from_graph(group: GraphGroup) -> Group {
    Group {
        id: group.id.unwrap_or_default(),
        name: group.display_name.unwrap_or_default(),
    }
}

/// Graph rejects spaces and most punctuation in `mailNickname`.
pub fn group_mail_nickname(name: &str) -> String {
    let nickname: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    if nickname.is_empty() {
        "group".to_string()
    } else {
        nickname
    }
}

pub fn license_from_graph(sku: SubscribedSku) -> License {
    License {
        id: sku.id,
        sku: sku.sku_id,
        name: sku.sku_part_number.unwrap_or_default(),
        consumed: sku.consumed_units.unwrap_or(0),
        total: sku
            .prepaid_units
            .and_then(|units| units.enabled)
            .unwrap_or(0),
    }
}

/// Quote a value for use inside an OData string literal.
pub fn odata_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
