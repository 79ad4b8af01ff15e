//! Dependency health probe.
//!
//! Probes the record store, blob store, and identity provider concurrently
//! and reports the aggregate. Individual probe failures are folded into the
//! report and never fail the request; only a failure in aggregation itself
//! produces the fixed 500 answer.

mod diagnostics;
mod status;

pub use diagnostics::{Diagnostics, InvocationReport, MemoryUsage};
pub use status::{
    Health, ServiceHealth, ServiceStatus, SERVICE_DATABASE, SERVICE_IDENTITY, SERVICE_STORAGE,
};

use std::panic::AssertUnwindSafe;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use http::StatusCode;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use crate::config::{
    HandlerConfig, PROBE_BLOB_MAX_KEYS, PROBE_IDENTITY_MAX_RESULTS, PROBE_RECORD_LIMIT,
    RUNTIME_VERSION,
};
use crate::error::HandlerError;
use crate::handler::{Handler, HandlerResponse, RequestContext};
use crate::probes::Dependencies;

/// Query flag requesting extended output. Only this exact value enables it.
pub const DETAILED_FLAG: &str = "detailed";
const DETAILED_ENABLED: &str = "true";

#[derive(Debug, Serialize)]
pub struct EnvironmentReport {
    pub stage: String,
    pub region: String,
    pub runtime: &'static str,
}

/// Body of a completed health check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: Health,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub services: ServiceHealth,
    pub environment: EnvironmentReport,
    pub response_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
}

pub struct HealthHandler {
    deps: Dependencies,
    config: HandlerConfig,
    started_at: Instant,
}

impl HealthHandler {
    /// `started_at` is the process start used to report uptime.
    pub fn new(deps: Dependencies, config: HandlerConfig, started_at: Instant) -> Self {
        Self {
            deps,
            config,
            started_at,
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Probe all three services. None is skipped because another failed.
    pub async fn probe(&self) -> ServiceStatus {
        let (database, storage, identity) = tokio::join!(
            self.deps.records.scan(PROBE_RECORD_LIMIT),
            self.deps.blobs.list_objects(PROBE_BLOB_MAX_KEYS),
            self.deps.identity.list_user_pools(PROBE_IDENTITY_MAX_RESULTS),
        );
        ServiceStatus::from_outcomes(database, storage, identity)
    }

    async fn check(&self, ctx: &RequestContext) -> Result<HandlerResponse, HandlerError> {
        let start = Instant::now();
        let status = self.probe().await;
        let elapsed = start.elapsed();

        let overall = status.overall();
        for error in &status.errors {
            tracing::warn!(request_id = %ctx.request_id, error = %error, "Dependency probe failed");
        }

        let detailed = ctx.query(DETAILED_FLAG) == Some(DETAILED_ENABLED);

        let report = HealthReport {
            status: overall,
            timestamp: Utc::now(),
            request_id: ctx.request_id.clone(),
            services: status.services,
            environment: EnvironmentReport {
                stage: self.config.stage.clone(),
                region: self.config.region.clone(),
                runtime: RUNTIME_VERSION,
            },
            response_time: format!("{}ms", elapsed.as_millis()),
            errors: (!status.errors.is_empty()).then_some(status.errors),
            diagnostics: detailed.then(|| Diagnostics::collect(self.started_at, &ctx.invocation)),
        };

        let code = if overall.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        tracing::info!(
            request_id = %ctx.request_id,
            status = ?overall,
            duration_ms = elapsed.as_millis() as u64,
            "Health check completed"
        );

        HandlerResponse::json(code, &report)
    }

    /// Fixed answer when the check itself could not complete.
    fn failure_response(ctx: &RequestContext) -> HandlerResponse {
        let body = json!({
            "status": Health::Unhealthy,
            "error": "Health check failed",
            "requestId": ctx.request_id,
        });
        HandlerResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers: Default::default(),
            body: body.to_string(),
        }
    }
}

#[async_trait]
impl Handler for HealthHandler {
    #[instrument(name = "health::check", skip(self, ctx), fields(request_id = %ctx.request_id))]
    async fn handle(&self, ctx: &RequestContext) -> Result<HandlerResponse, HandlerError> {
        match AssertUnwindSafe(self.check(ctx)).catch_unwind().await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => {
                tracing::error!(error = ?err, "Health check failed");
                Ok(Self::failure_response(ctx))
            }
            Err(_) => {
                tracing::error!("Health check panicked");
                Ok(Self::failure_response(ctx))
            }
        }
    }
}
