//! Microsoft Graph directory adapter
//!
//! Maps a provider-independent directory model (users, groups, licenses and
//! invitations) onto the Microsoft Graph API. Generic code talks to the
//! [`DirectoryService`] port; [`GraphClient`] implements it over Graph.

pub mod config;
pub mod directory;
pub mod domain;
pub mod error;
pub mod graph;
pub mod registry;
pub mod service;
pub mod telemetry;

// Re-export commonly used types
pub use config::{Config, GraphConfig};
pub use directory::DirectoryService;
pub use error::{DirectoryError, Result};
pub use graph::GraphClient;
pub use registry::ProviderRegistry;
