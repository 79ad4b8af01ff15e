//! Capabilities of the three managed services the health probe checks.
//!
//! The probe only needs to know whether a bounded, read-only call succeeds,
//! so each service is reduced to that one call. [`http::HttpServiceClient`]
//! implements all three against plain HTTP endpoints.

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;

pub use self::http::HttpServiceClient;

/// Failure of a single dependency call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("{0}")]
    Unavailable(String),
}

/// Structured-record store (tables of tree records).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read at most `limit` records.
    async fn scan(&self, limit: u32) -> Result<(), ProbeError>;
}

/// Blob store (tree photos).
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// List at most `max_keys` object keys.
    async fn list_objects(&self, max_keys: u32) -> Result<(), ProbeError>;
}

/// Identity provider (user pools).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// List at most `max_results` user pools.
    async fn list_user_pools(&self, max_results: u32) -> Result<(), ProbeError>;
}

/// The three probed services, shared across invocations.
#[derive(Clone)]
pub struct Dependencies {
    pub records: Arc<dyn RecordStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl Dependencies {
    pub fn new(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            records,
            blobs,
            identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_error_display() {
        assert_eq!(
            ProbeError::Status(503).to_string(),
            "unexpected status 503"
        );
        assert_eq!(ProbeError::Timeout(2000).to_string(), "timed out after 2000ms");
        assert_eq!(
            ProbeError::Unavailable("bucket missing".to_string()).to_string(),
            "bucket missing"
        );
    }
}
