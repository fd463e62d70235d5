//! Forwards scheduled sync requests to the external Magento sync function.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

use magdash_core::AppConfig;

/// Errors raised while relaying a scheduled sync.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("sync endpoint is not configured (MAGDASH_SYNC_ENDPOINT or MAGDASH_HOSTED_URL)")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sync endpoint returned invalid JSON: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Stateless client for the sync endpoint. Each call is one POST; nothing is
/// retried and concurrent calls are not coordinated.
#[derive(Clone)]
pub struct SyncRelay {
    http: Client,
    endpoint: Option<String>,
    bearer: Option<String>,
}

impl std::fmt::Debug for SyncRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRelay")
            .field("endpoint", &self.endpoint)
            .field("bearer", &self.bearer.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

impl SyncRelay {
    /// # Errors
    ///
    /// Returns [`RelayError::Http`] if the HTTP client cannot be built.
    pub fn new(
        endpoint: Option<&str>,
        bearer: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, RelayError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.map(str::to_owned),
            bearer: bearer.map(str::to_owned),
        })
    }

    /// # Errors
    ///
    /// Returns [`RelayError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, RelayError> {
        Self::new(
            config.sync_endpoint.as_deref(),
            config.sync_bearer.as_deref(),
            config.http_timeout_secs,
        )
    }

    /// POST `{"source":"scheduled_job"}` to the sync endpoint and return its
    /// JSON reply.
    ///
    /// The reply is returned whatever the HTTP status; only transport and
    /// JSON failures are errors.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError`] when no endpoint is configured, the request
    /// fails, or the body is not JSON.
    pub async fn trigger(&self) -> Result<Value, RelayError> {
        let endpoint = self.endpoint.as_deref().ok_or(RelayError::NotConfigured)?;

        let mut request = self
            .http
            .post(endpoint)
            .json(&json!({ "source": "scheduled_job" }));
        if let Some(bearer) = &self.bearer {
            request = request.bearer_auth(bearer);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "relay: sync endpoint returned non-success status");
        }
        let body = response.bytes().await?;
        let result: Value = serde_json::from_slice(&body).map_err(RelayError::Deserialize)?;
        tracing::info!(status = status.as_u16(), "relay: scheduled sync forwarded");
        Ok(result)
    }
}
