//! Unified error handling for the directory adapter

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// OData error codes that mean "the addressed resource does not exist".
pub const RESOURCE_NOT_FOUND_CODES: &[&str] = &["Request_ResourceNotFound", "ResourceNotFound"];

/// Directory error types
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Graph request failed ({status}): {code} - {message}")]
    Request {
        status: u16,
        code: String,
        message: String,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DirectoryError {
    /// Remote error code, when the failure came from the directory service.
    pub fn code(&self) -> Option<&str> {
        match self {
            DirectoryError::Request { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether this is a remote "resource not found" failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            DirectoryError::Request { status, code, .. } => is_not_found(*status, code),
            _ => false,
        }
    }
}

/// Classify a remote failure as "not found".
///
/// The OData code wins; a bare 404 only counts when the body carried no code.
pub fn is_not_found(status: u16, code: &str) -> bool {
    if RESOURCE_NOT_FOUND_CODES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(code))
    {
        return true;
    }
    status == 404 && code.is_empty()
}

/// A locally-encoded custom attribute blob that could not be read back.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Malformed custom attributes ({reason}): {raw:?}")]
pub struct DecodeError {
    /// The field value exactly as stored in the directory
    pub raw: String,
    pub reason: String,
}

/// Outcome of a multi-item operation where some items failed.
#[derive(Debug, Default)]
pub struct BatchError {
    pub failures: Vec<(String, DirectoryError)>,
}

impl BatchError {
    pub fn push(&mut self, item: impl Into<String>, error: DirectoryError) {
        self.failures.push((item.into(), error));
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// `Ok(())` when nothing failed, otherwise the aggregate as an error.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DirectoryError::Batch(self))
        }
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} item(s) failed", self.failures.len())?;
        for (item, error) in &self.failures {
            write!(f, "; {}: {}", item, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchError {}

// Conversion from validation errors
impl From<validator::ValidationErrors> for DirectoryError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DirectoryError::Validation(errors.to_string())
    }
}
