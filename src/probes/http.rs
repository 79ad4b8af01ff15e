//! HTTP-backed dependency clients.
//!
//! Each probe is a single `GET` to the configured endpoint with its bound
//! passed as a query parameter. Any 2xx counts as reachable.

use std::time::Duration;

use async_trait::async_trait;

use super::{BlobStore, Dependencies, IdentityProvider, ProbeError, RecordStore};
use crate::config::ServicesConfig;

/// Client for one dependency endpoint.
#[derive(Debug, Clone)]
pub struct HttpServiceClient {
    http_client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpServiceClient {
    pub fn new(http_client: reqwest::Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Build clients for all three configured services over one shared
    /// connection pool.
    pub fn dependencies(config: &ServicesConfig) -> Result<Dependencies, ProbeError> {
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ProbeError::Request(format!("Failed to create HTTP client: {}", e)))?;
        let timeout = Duration::from_millis(config.probe_timeout_ms);

        let client = |endpoint: &str| {
            std::sync::Arc::new(Self::new(http_client.clone(), endpoint, timeout))
        };

        Ok(Dependencies::new(
            client(&config.record_store),
            client(&config.blob_store),
            client(&config.identity),
        ))
    }

    async fn probe(&self, param: &str, bound: u32) -> Result<(), ProbeError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[(param, bound)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    ProbeError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(endpoint = %self.endpoint, status = %status, "Probe rejected");
            return Err(ProbeError::Status(status.as_u16()));
        }

        Ok(())
    }
}

#[async_trait]
impl RecordStore for HttpServiceClient {
    async fn scan(&self, limit: u32) -> Result<(), ProbeError> {
        self.probe("limit", limit).await
    }
}

#[async_trait]
impl BlobStore for HttpServiceClient {
    async fn list_objects(&self, max_keys: u32) -> Result<(), ProbeError> {
        self.probe("max-keys", max_keys).await
    }
}

#[async_trait]
impl IdentityProvider for HttpServiceClient {
    async fn list_user_pools(&self, max_results: u32) -> Result<(), ProbeError> {
        self.probe("maxResults", max_results).await
    }
}
