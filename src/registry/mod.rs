//! Named directory drivers
//!
//! Callers pick an identity provider by name at runtime. The registry is an
//! ordinary value; build one with [`ProviderRegistry::with_defaults`] and
//! register extra drivers on it as needed.

use crate::config::{EnvSource, GraphConfig};
use crate::directory::DirectoryService;
use crate::error::{DirectoryError, Result};
use crate::graph::GraphClient;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Driver name of the Microsoft Graph provider
pub const MSGRAPH_DRIVER: &str = "msgraph";

/// Environment key that names the driver in [`ProviderRegistry::create_from_env`]
pub const DEFAULT_DRIVER_KEY: &str = "DIRECTORY_DRIVER";

/// Builds a configured [`DirectoryService`] from environment-style settings.
#[async_trait]
pub trait DirectoryProviderFactory: Send + Sync {
    fn name(&self) -> &str;

    async fn create(&self, env: &dyn EnvSource) -> Result<Arc<dyn DirectoryService>>;
}

/// Microsoft Graph driver. Creating it acquires a token, so bad credentials
/// fail here rather than on first use.
#[derive(Debug, Default, Clone, Copy)]
pub struct MsGraphProviderFactory;

#[async_trait]
impl DirectoryProviderFactory for MsGraphProviderFactory {
    fn name(&self) -> &str {
        MSGRAPH_DRIVER
    }

    async fn create(&self, env: &dyn EnvSource) -> Result<Arc<dyn DirectoryService>> {
        let config = GraphConfig::from_source(env)?;
        let client = GraphClient::connect(config).await?;
        Ok(Arc::new(client))
    }
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    factories: HashMap<String, Arc<dyn DirectoryProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in driver
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MsGraphProviderFactory));
        registry
    }

    /// Add a driver, replacing any earlier one with the same name.
    pub fn register(&mut self, factory: Arc<dyn DirectoryProviderFactory>) {
        let name = factory.name().to_ascii_lowercase();
        if self.factories.insert(name.clone(), factory).is_some() {
            tracing::debug!(driver = %name, "Replaced directory driver");
        }
    }

    /// Registered driver names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn get(&self, driver: &str) -> Option<Arc<dyn DirectoryProviderFactory>> {
        self.factories
            .get(&driver.trim().to_ascii_lowercase())
            .cloned()
    }

    /// Create a provider by driver name (case-insensitive).
    pub async fn create(
        &self,
        driver: &str,
        env: &dyn EnvSource,
    ) -> Result<Arc<dyn DirectoryService>> {
        let factory = self.get(driver).ok_or_else(|| {
            DirectoryError::Configuration(format!(
                "unknown directory driver {:?} (available: {})",
                driver,
                self.names().join(", ")
            ))
        })?;

        tracing::info!(driver = %factory.name(), "Creating directory provider");
        factory.create(env).await
    }

    /// Create the provider named by `driver_key` in `env`.
    pub async fn create_from_env(
        &self,
        env: &dyn EnvSource,
        driver_key: &str,
    ) -> Result<Arc<dyn DirectoryService>> {
        let driver = env
            .get(driver_key)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                DirectoryError::Configuration(format!("{} is not set", driver_key))
            })?;
        self.create(&driver, env).await
    }
}
