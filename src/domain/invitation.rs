//! Guest invitation domain model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to invite an external user. Nothing is kept locally once sent.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Invitation {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 256))]
    pub display_name: String,
    #[validate(url)]
    pub redirect_url: String,
    /// Whether the directory should email the invite itself
    pub send_email: bool,
}
