//! Request envelope shared by every handler.
//!
//! A [`Handler`] holds business logic only. [`handle`] wraps any handler with
//! the common behavior: request logging, the OPTIONS pre-flight short-circuit,
//! the fixed cross-origin headers, and the mapping from [`HandlerError`] to a
//! structured failure response carrying the invocation identifier.

mod context;
mod response;

pub use context::{InvocationMeta, RequestContext};
#[cfg(test)]
pub(crate) use context::tests::context as test_context;
pub use response::{
    HandlerResponse, FIXED_HEADERS, HEADER_ALLOW_HEADERS, HEADER_ALLOW_METHODS,
    HEADER_ALLOW_ORIGIN, HEADER_CONTENT_TYPE, HEADER_MAX_AGE,
};

use std::collections::HashMap;

use async_trait::async_trait;
use http::Method;
use serde_json::json;

use crate::config::HandlerConfig;
use crate::error::HandlerError;

/// Request headers whose values never reach the logs
const MASKED_HEADERS: [&str; 2] = ["authorization", "cookie"];

/// Copy of `headers` safe to log: credential values are replaced.
fn masked_headers(headers: &HashMap<String, String>) -> HashMap<&str, &str> {
    headers
        .iter()
        .map(|(name, value)| {
            let masked = MASKED_HEADERS
                .iter()
                .any(|m| name.eq_ignore_ascii_case(m));
            (name.as_str(), if masked { "***" } else { value.as_str() })
        })
        .collect()
}

/// Business logic consuming a request context.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &RequestContext) -> Result<HandlerResponse, HandlerError>;
}

/// Run `handler` inside the request envelope.
///
/// Always produces a response; failures are logged and converted here and
/// nowhere else.
pub async fn handle<H>(handler: &H, ctx: &RequestContext, config: &HandlerConfig) -> HandlerResponse
where
    H: Handler + ?Sized,
{
    tracing::info!(
        request_id = %ctx.request_id,
        method = %ctx.method,
        path = %ctx.path,
        headers = ?masked_headers(&ctx.headers),
        "Handling request"
    );

    if ctx.method == Method::OPTIONS {
        return HandlerResponse::preflight();
    }

    match handler.handle(ctx).await {
        Ok(response) => response.with_fixed_headers(),
        Err(err) => {
            tracing::error!(
                request_id = %ctx.request_id,
                kind = err.kind(),
                error = ?err,
                "Handler failed"
            );
            error_response(&err, ctx, config)
        }
    }
}

/// Structured failure response for `err`.
pub fn error_response(
    err: &HandlerError,
    ctx: &RequestContext,
    config: &HandlerConfig,
) -> HandlerResponse {
    let mut body = json!({
        "error": err.kind(),
        "message": err.public_message(),
        "requestId": ctx.request_id,
    });
    if !config.is_production() {
        body["trace"] = json!(err.trace());
    }

    HandlerResponse {
        status: err.status(),
        headers: Default::default(),
        body: body.to_string(),
    }
    .with_fixed_headers()
}
