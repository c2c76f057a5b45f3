//! Location relay: queries the upstream REST API through a list of fallback
//! endpoints and always hands back a well-formed [`RelayEnvelope`].

use std::time::Duration;

use civmap_core::AppConfig;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::envelope::RelayEnvelope;
use crate::error::ClientError;
use crate::query::LocationQuery;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "http://localhost:3002";
const DEFAULT_ENDPOINTS: [&str; 3] = ["/api/maps/local", "/api/maps/json", "/api/test-kml-import"];

/// Connection and fallback settings for [`RelayClient`].
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub base_url: String,
    /// Paths appended to `base_url`, tried in order.
    pub endpoints: Vec<String>,
    /// Per-endpoint request timeout.
    pub endpoint_timeout: Duration,
    /// Overall client timeout.
    pub client_timeout: Duration,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            endpoints: DEFAULT_ENDPOINTS.iter().map(|&e| e.to_owned()).collect(),
            endpoint_timeout: Duration::from_secs(10),
            client_timeout: Duration::from_secs(15),
            user_agent: "civmap/0.1 (municipal-portal)".to_owned(),
            max_retries: 0,
            backoff_base_ms: 250,
        }
    }
}

impl RelaySettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            endpoints: config.relay_endpoints.clone(),
            endpoint_timeout: Duration::from_secs(config.relay_timeout_secs),
            client_timeout: Duration::from_secs(config.client_timeout_secs),
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

/// Client for the upstream location API.
///
/// Use [`RelayClient::from_config`] in the application or
/// [`RelayClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
    endpoints: Vec<String>,
    endpoint_timeout: Duration,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl RelayClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `settings.base_url` does not parse.
    pub fn new(settings: RelaySettings) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(settings.client_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        let base_url = settings.base_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            endpoints: settings.endpoints,
            endpoint_timeout: settings.endpoint_timeout,
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    /// # Errors
    ///
    /// See [`RelayClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(RelaySettings::from_config(config))
    }

    /// Default settings against a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// See [`RelayClient::new`].
    pub fn with_base_url(base_url: &str) -> Result<Self, ClientError> {
        Self::new(RelaySettings {
            base_url: base_url.to_owned(),
            ..RelaySettings::default()
        })
    }

    #[must_use]
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Queries each endpoint in order and returns the first 2xx answer,
    /// normalized. Never fails: when every endpoint fails the result is the
    /// zeroed "unreachable" envelope carrying the last error.
    pub async fn relay(&self, query: &LocationQuery) -> RelayEnvelope {
        let mut last_error: Option<ClientError> = None;

        for endpoint in &self.endpoints {
            let url = match self.endpoint_url(endpoint, query) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "skipping malformed endpoint");
                    last_error = Some(e);
                    continue;
                }
            };

            tracing::debug!(url = %url, "trying location endpoint");
            let attempt = retry_with_backoff(endpoint, self.max_retries, self.backoff_base_ms, || {
                self.request_body(&url)
            })
            .await;

            match attempt {
                Ok(body) => {
                    let used = self.endpoint_label(endpoint);
                    let envelope = RelayEnvelope::from_body(&body, query, &used);
                    tracing::info!(
                        endpoint = %used,
                        count = envelope.data.len(),
                        total = envelope.pagination.total,
                        success = envelope.success,
                        "location API responded"
                    );
                    return envelope;
                }
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "location endpoint failed");
                    last_error = Some(e);
                }
            }
        }

        let message = last_error.map_or_else(
            || "no location endpoints configured".to_owned(),
            |e| e.to_string(),
        );
        tracing::error!(error = %message, "all location endpoints failed");
        RelayEnvelope::unreachable(message)
    }

    fn endpoint_label(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    /// Full request URL with the query appended through
    /// [`Url::query_pairs_mut`] so values are percent-encoded.
    fn endpoint_url(&self, endpoint: &str, query: &LocationQuery) -> Result<Url, ClientError> {
        let raw = self.endpoint_label(endpoint);
        let mut url = Url::parse(&raw).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: raw.clone(),
            reason: e.to_string(),
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query.to_pairs() {
                pairs.append_pair(k, &v);
            }
        }
        Ok(url)
    }

    /// Sends one GET. A 2xx body that is not JSON is replaced by the
    /// "Invalid JSON from API" body rather than failing, so the endpoint
    /// still counts as having answered.
    async fn request_body(&self, url: &Url) -> Result<Value, ClientError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .timeout(self.endpoint_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                url = %url,
                status = status.as_u16(),
                body = %body.chars().take(200).collect::<String>(),
                "endpoint responded with error status"
            );
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let raw = response.text().await?;
        match serde_json::from_str(&raw) {
            Ok(body) => Ok(body),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "response is not valid JSON");
                Ok(RelayEnvelope::invalid_json_body(&raw))
            }
        }
    }
}
