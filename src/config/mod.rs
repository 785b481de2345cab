//! Configuration management for the directory adapter

use crate::error::{DirectoryError, Result};
use std::collections::HashMap;
use std::env;
use std::fmt;
use url::Url;

/// Fields requested for every user lookup unless overridden.
pub const DEFAULT_USER_SELECT_FIELDS: &[&str] = &[
    "id",
    "accountEnabled",
    "businessPhones",
    "displayName",
    "givenName",
    "surname",
    "jobTitle",
    "mail",
    "mobilePhone",
    "officeLocation",
    "userPrincipalName",
    "assignedLicenses",
    "companyName",
    "department",
    "streetAddress",
];

pub const SIGN_IN_ACTIVITY_FIELD: &str = "signInActivity";

/// Key/value source for configuration.
///
/// Keeps configuration loading free of process-wide state so callers (and
/// tests) can hand in any environment they like.
pub trait EnvSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Microsoft Graph connection settings
    pub graph: GraphConfig,
    /// Logging / metrics settings
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "json" or "pretty"
    pub log_format: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "pretty".to_string(),
        }
    }
}

/// A national cloud: token authority plus Graph endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloudInstance {
    #[default]
    Public,
    UsGovernment,
    China,
}

impl CloudInstance {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::UsGovernment => "USGovernment",
            Self::China => "China",
        }
    }

    /// Token authority for this cloud
    pub fn login_url(&self) -> &'static str {
        match self {
            Self::Public => "https://login.microsoftonline.com",
            Self::UsGovernment => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
        }
    }

    /// Graph API root for this cloud
    pub fn graph_url(&self) -> &'static str {
        match self {
            Self::Public => "https://graph.microsoft.com",
            Self::UsGovernment => "https://graph.microsoft.us",
            Self::China => "https://microsoftgraph.chinacloudapi.cn",
        }
    }

    /// Resolve an instance by name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self> {
        [Self::Public, Self::UsGovernment, Self::China]
            .into_iter()
            .find(|instance| instance.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| {
                DirectoryError::Configuration(format!("invalid instance name: {}", name))
            })
    }
}

/// Graph API version segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    #[default]
    V1,
    Beta,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1.0",
            Self::Beta => "beta",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "v1.0" | "v1" => Ok(Self::V1),
            "beta" => Ok(Self::Beta),
            other => Err(DirectoryError::Configuration(format!(
                "invalid API version: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub instance: CloudInstance,
    /// Token authority, e.g. https://login.microsoftonline.com
    pub login_url: String,
    /// Graph root without version, e.g. https://graph.microsoft.com
    pub api_base: String,
    pub version: ApiVersion,
    /// `$select` list for user reads
    pub select_fields: Vec<String>,
    /// `$top` for list requests; `None` leaves paging to the server
    pub page_size: Option<u32>,
    pub request_timeout_secs: u64,
}

// The secret never reaches logs.
impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("instance", &self.instance)
            .field("login_url", &self.login_url)
            .field("api_base", &self.api_base)
            .field("version", &self.version)
            .field("select_fields", &self.select_fields)
            .field("page_size", &self.page_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        let instance = CloudInstance::default();
        Self {
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            instance,
            login_url: instance.login_url().to_string(),
            api_base: instance.graph_url().to_string(),
            version: ApiVersion::default(),
            select_fields: default_select_fields(),
            page_size: None,
            request_timeout_secs: 30,
        }
    }
}

pub fn default_select_fields() -> Vec<String> {
    DEFAULT_USER_SELECT_FIELDS
        .iter()
        .map(|field| field.to_string())
        .collect()
}

impl GraphConfig {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    /// Point both endpoints at a national cloud.
    pub fn with_instance(mut self, instance: CloudInstance) -> Self {
        self.instance = instance;
        self.login_url = instance.login_url().to_string();
        self.api_base = instance.graph_url().to_string();
        self
    }

    /// Explicit endpoints, e.g. a proxy or a local fake.
    pub fn with_endpoints(mut self, login_url: &str, api_base: &str) -> Self {
        self.login_url = login_url.trim_end_matches('/').to_string();
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    /// Load from an environment source.
    ///
    /// Missing credentials are not rejected here; `validate` does that so
    /// the error surfaces when the client is configured.
    pub fn from_source(source: &dyn EnvSource) -> Result<Self> {
        let read = |key: &str| {
            source
                .get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let instance = match (read("AZ_INSTANCE"), read("AZ_REGION")) {
            (Some(name), _) => CloudInstance::from_name(&name)?,
            (None, Some(region)) if region.to_ascii_lowercase().starts_with("usgov") => {
                CloudInstance::UsGovernment
            }
            _ => CloudInstance::Public,
        };

        let mut config = Self::new(
            read("AZ_TENANT_ID").unwrap_or_default(),
            read("AZ_CLIENT_ID").unwrap_or_default(),
            read("AZ_CLIENT_SECRET").unwrap_or_default(),
        )
        .with_instance(instance);

        if let Some(login_url) = read("AZ_LOGIN_URL") {
            config.login_url = login_url.trim_end_matches('/').to_string();
        }

        // Older deployments put the version on the base URL
        let mut base_version = None;
        if let Some(api_base) = read("AZ_API_BASE") {
            let (base, version) = split_api_base(&api_base);
            config.api_base = base;
            base_version = version;
        }

        config.version = match read("AZ_API_VERSION") {
            Some(version) => ApiVersion::parse(&version)?,
            None => base_version.unwrap_or_default(),
        };

        if let Some(fields) = read("AZ_SELECT_FIELDS") {
            let fields: Vec<String> = fields
                .split(',')
                .map(|field| field.trim().to_string())
                .filter(|field| !field.is_empty())
                .collect();
            if fields.is_empty() {
                tracing::warn!("AZ_SELECT_FIELDS names no fields, using the defaults");
            } else {
                config.select_fields = fields;
            }
        }

        if read("MSGRAPH_INCLUDE_SIGN_IN")
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false)
        {
            config.select_fields.push(SIGN_IN_ACTIVITY_FIELD.to_string());
        }

        config.page_size = read("MSGRAPH_PAGE_SIZE").and_then(|s| s.parse().ok());
        config.request_timeout_secs = read("MSGRAPH_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(config)
    }

    /// Check that the configuration can be used to reach the directory.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("tenant id", &self.tenant_id),
            ("client id", &self.client_id),
            ("client secret", &self.client_secret),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(DirectoryError::Configuration(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        if self.select_fields.is_empty() {
            return Err(DirectoryError::Configuration(
                "user select list is empty".to_string(),
            ));
        }

        for (name, value) in [("login URL", &self.login_url), ("API base", &self.api_base)] {
            Url::parse(value).map_err(|e| {
                DirectoryError::Configuration(format!("invalid {} {:?}: {}", name, value, e))
            })?;
        }

        Ok(())
    }

    /// OAuth2 scope covering the whole Graph resource
    pub fn scope(&self) -> String {
        format!("{}/.default", self.api_base)
    }

    /// Token endpoint for the client-credentials grant
    pub fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.login_url, self.tenant_id)
    }

    /// Versioned root all Graph paths hang off
    pub fn versioned_base(&self) -> String {
        format!("{}/{}", self.api_base, self.version)
    }
}

/// Split a base URL such as `https://graph.microsoft.us/v1.0` into root and version.
fn split_api_base(value: &str) -> (String, Option<ApiVersion>) {
    let trimmed = value.trim_end_matches('/');
    for version in [ApiVersion::V1, ApiVersion::Beta] {
        let suffix = format!("/{}", version.as_str());
        if let Some(root) = trimmed.strip_suffix(&suffix) {
            return (root.to_string(), Some(version));
        }
    }
    (trimmed.to_string(), None)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(source: &dyn EnvSource) -> Result<Self> {
        Ok(Self {
            graph: GraphConfig::from_source(source)?,
            telemetry: TelemetryConfig {
                log_format: source
                    .get("LOG_FORMAT")
                    .unwrap_or_else(|| "pretty".to_string()),
            },
        })
    }
}
