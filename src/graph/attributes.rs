//! Custom attribute storage.
//!
//! Graph's custom security attributes behave differently across API versions,
//! so the attributes are kept in a field we control instead: the
//! [`CustomAttributes`] struct is serialized to JSON, base64-encoded (standard
//! alphabet, padded) and written to the user's `streetAddress`.
//!
//! Attributes written into the vendor `customSecurityAttributes` bag by older
//! releases are not read back.

use crate::domain::{AttributeState, CustomAttributes};
use crate::error::DecodeError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode attributes for storage. An empty set encodes to nothing.
pub fn encode(attributes: &CustomAttributes) -> Option<String> {
    if attributes.is_empty() {
        return None;
    }
    // Serializing a struct of strings cannot fail
    let json = serde_json::to_vec(attributes).ok()?;
    Some(STANDARD.encode(json))
}

/// Decode the stored field. `None` or blank means no attributes were stored.
pub fn decode(raw: Option<&str>) -> AttributeState {
    let (raw, value) = match raw {
        Some(raw) if !raw.trim().is_empty() => (raw, raw.trim()),
        _ => return AttributeState::Absent,
    };

    let bytes = match STANDARD.decode(value) {
        Ok(bytes) => bytes,
        Err(e) => return malformed(raw, format!("invalid base64: {}", e)),
    };

    match serde_json::from_slice::<CustomAttributes>(&bytes) {
        Ok(attributes) if attributes.is_empty() => AttributeState::Absent,
        Ok(attributes) => AttributeState::Present(attributes),
        Err(e) => malformed(raw, format!("invalid JSON: {}", e)),
    }
}

fn malformed(raw: &str, reason: String) -> AttributeState {
    tracing::warn!(reason = %reason, "Custom attribute field could not be decoded");
    AttributeState::Malformed(DecodeError {
        raw: raw.to_string(),
        reason,
    })
}
