//! Microsoft Graph directory provider
//!
//! This module provides a client for the Microsoft Graph REST API. It handles
//! app-only authentication, token caching, error translation and paging for
//! the user, group, license and invitation operations.

pub mod attributes;
pub mod convert;
mod groups;
mod invitations;
mod licenses;
mod service;
pub mod types;
mod users;

use crate::config::GraphConfig;
use crate::domain::{Page, PageCursor};
use crate::error::{DirectoryError, Result};
use crate::telemetry::metrics;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use url::Url;

use types::{Collection, ODataErrorResponse, TokenErrorResponse};

/// Header Graph requires on advanced queries (`$count`, `$filter` on most properties)
pub const CONSISTENCY_LEVEL_HEADER: &str = "ConsistencyLevel";

/// Tokens are refreshed this long before they expire.
const TOKEN_EXPIRY_SKEW_SECS: i64 = 60;

/// Microsoft Graph client
#[derive(Clone)]
pub struct GraphClient {
    config: GraphConfig,
    base_url: Url,
    http_client: Client,
    token: Arc<RwLock<Option<AccessToken>>>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    access_token: String,
    expires_at: chrono::DateTime<chrono::Utc>,
}

impl GraphClient {
    /// Create a client without contacting the service.
    pub fn new(config: GraphConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.versioned_base()).map_err(|e| {
            DirectoryError::Configuration(format!("invalid Graph endpoint: {}", e))
        })?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                DirectoryError::Configuration(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            config,
            base_url,
            http_client,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Create a client and prove the credentials by acquiring a token.
    pub async fn connect(config: GraphConfig) -> Result<Self> {
        let client = Self::new(config)?;
        client.access_token().await?;
        tracing::info!(
            tenant_id = %client.config.tenant_id,
            api_base = %client.base_url,
            "Connected to Microsoft Graph"
        );
        Ok(client)
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Get an app-only access token (with caching)
    async fn access_token(&self) -> Result<String> {
        {
            let token = self.token.read().await;
            if let Some(ref t) = *token {
                if t.expires_at
                    > chrono::Utc::now() + chrono::Duration::seconds(TOKEN_EXPIRY_SKEW_SECS)
                {
                    return Ok(t.access_token.clone());
                }
            }
        }

        let scope = self.config.scope();
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .http_client
            .post(self.config.token_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                metrics::record_token_request("error");
                DirectoryError::Authentication(format!("token request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(TokenErrorResponse {
                    error,
                    error_description: Some(description),
                }) => format!("{}: {}", error, description),
                Ok(TokenErrorResponse { error, .. }) => error,
                Err(_) => body,
            };
            metrics::record_token_request("rejected");
            tracing::warn!(status = status.as_u16(), "Token request rejected");
            return Err(DirectoryError::Authentication(format!(
                "token request rejected ({}): {}",
                status.as_u16(),
                detail
            )));
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: i64,
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            metrics::record_token_request("error");
            DirectoryError::Authentication(format!("failed to parse token response: {}", e))
        })?;

        let access_token = AccessToken {
            access_token: token_response.access_token.clone(),
            expires_at: chrono::Utc::now() + chrono::Duration::seconds(token_response.expires_in),
        };

        {
            let mut token = self.token.write().await;
            *token = Some(access_token);
        }

        metrics::record_token_request("success");
        tracing::debug!(expires_in = token_response.expires_in, "Acquired Graph access token");

        Ok(token_response.access_token)
    }

    /// Versioned endpoint URL for the given path segments.
    ///
    /// Segments are percent-encoded individually, so ids and UPNs can be
    /// passed as they are.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DirectoryError::Configuration(format!(
                    "Graph endpoint {} cannot take a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `@odata.id` reference for any directory object
    fn directory_object_ref(&self, id: &str) -> String {
        format!("{}/directoryObjects/{}", self.config.versioned_base(), id)
    }

    /// Authenticate and send a request, translating non-success statuses.
    async fn send(&self, request: RequestBuilder, operation: &'static str) -> Result<Response> {
        let token = self.access_token().await?;
        let started = Instant::now();

        let response = match request.bearer_auth(token).send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_graph_request(operation, "error", started.elapsed());
                tracing::warn!(operation, error = %e, "Graph request failed to complete");
                return Err(e.into());
            }
        };

        let status = response.status();
        metrics::record_graph_request(operation, status.as_str(), started.elapsed());

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = match serde_json::from_str::<ODataErrorResponse>(&body) {
            Ok(parsed) => parsed.error,
            Err(_) => types::ODataError {
                code: String::new(),
                message: if body.is_empty() {
                    status.canonical_reason().unwrap_or_default().to_string()
                } else {
                    body
                },
            },
        };

        tracing::debug!(
            operation,
            status = status.as_u16(),
            code = %error.code,
            "Graph returned an error"
        );

        Err(DirectoryError::Request {
            status: status.as_u16(),
            code: error.code,
            message: error.message,
        })
    }

    /// GET a single resource; a missing resource is `Ok(None)`.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        operation: &'static str,
    ) -> Result<Option<T>> {
        match self
            .send(self.http_client.get(url).query(query), operation)
            .await
        {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetch one page of a collection.
    ///
    /// The first page is built from `url` and `query`; later pages follow the
    /// server's `@odata.nextLink` as is, since it already carries the query.
    async fn fetch_page<T: DeserializeOwned>(
        &self,
        url: Url,
        mut query: Vec<(&'static str, String)>,
        cursor: Option<PageCursor>,
        eventual: bool,
        operation: &'static str,
    ) -> Result<Page<T>> {
        let request = match cursor {
            Some(cursor) => self.http_client.get(self.cursor_url(&cursor)?),
            None => {
                if let Some(top) = self.config.page_size {
                    query.push(("$top", top.to_string()));
                }
                self.http_client.get(url).query(&query)
            }
        };

        let request = if eventual {
            request.header(CONSISTENCY_LEVEL_HEADER, "eventual")
        } else {
            request
        };

        let collection: Collection<T> = self.send(request, operation).await?.json().await?;
        Ok(Page::new(
            collection.value,
            collection.next_link.map(PageCursor::new),
        ))
    }

    /// Continuation links get our bearer token, so they must point back at Graph.
    fn cursor_url(&self, cursor: &PageCursor) -> Result<Url> {
        let url = Url::parse(cursor.as_str())
            .map_err(|e| DirectoryError::Validation(format!("invalid page cursor: {}", e)))?;

        let base_path = self.base_url.path().trim_end_matches('/');
        let same_path = url
            .path()
            .strip_prefix(base_path)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));

        let same_origin = url.scheme() == self.base_url.scheme()
            && url.host_str() == self.base_url.host_str()
            && url.port_or_known_default() == self.base_url.port_or_known_default()
            && url.username().is_empty()
            && url.password().is_none();

        if !(same_origin && same_path) {
            return Err(DirectoryError::Validation(format!(
                "page cursor does not belong to {}",
                self.base_url
            )));
        }
        Ok(url)
    }
}
