//! Adapter between axum requests and the handler envelope.
//!
//! Builds a [`RequestContext`] from the incoming request, runs the handler
//! through [`envelope::handle`] under the function's time budget, and turns
//! the resulting [`HandlerResponse`] back into an HTTP response.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::{
    body::{self, Body},
    extract::{Query, Request},
    response::{IntoResponse, Response},
};
use http::header::{HeaderName, HeaderValue};

use crate::error::HandlerError;
use crate::handler::{self as envelope, Handler, HandlerResponse, InvocationMeta, RequestContext};
use crate::middleware::InvocationId;
use crate::state::AppState;

/// Largest request body accepted, in bytes
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Run `handler` for `request` and convert the result to an HTTP response.
pub async fn invoke<H>(
    handler: &H,
    state: &AppState,
    invocation_id: &InvocationId,
    request: Request,
) -> Response
where
    H: Handler + ?Sized,
{
    let function = &state.config.function;
    let budget = Duration::from_secs(function.timeout_seconds);
    let meta = InvocationMeta {
        function_name: function.name.clone(),
        function_version: function.version.clone(),
        memory_limit_mb: function.memory_limit_mb,
        deadline: Instant::now() + budget,
    };

    let response = match build_context(invocation_id.to_string(), meta, request).await {
        Ok(ctx) => {
            match tokio::time::timeout(budget, envelope::handle(handler, &ctx, &state.handler_config))
                .await
            {
                Ok(response) => response,
                Err(_) => {
                    tracing::error!(request_id = %ctx.request_id, "Invocation exceeded time budget");
                    let err = HandlerError::internal(format!(
                        "invocation exceeded {}s time budget",
                        budget.as_secs()
                    ));
                    envelope::error_response(&err, &ctx, &state.handler_config)
                }
            }
        }
        Err((err, ctx)) => {
            tracing::warn!(request_id = %ctx.request_id, error = %err, "Rejected malformed request");
            envelope::error_response(&err, &ctx, &state.handler_config)
        }
    };

    into_http(response)
}

/// Build the context. On failure, also returns a bare context so the error
/// response can still carry the invocation identifier.
async fn build_context(
    request_id: String,
    invocation: InvocationMeta,
    request: Request,
) -> Result<RequestContext, (HandlerError, RequestContext)> {
    let (parts, body) = request.into_parts();

    let mut ctx = RequestContext {
        request_id,
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        headers: parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect(),
        query: HashMap::new(),
        body: None,
        invocation,
    };

    match Query::<HashMap<String, String>>::try_from_uri(&parts.uri) {
        Ok(Query(query)) => ctx.query = query,
        Err(e) => {
            let err = HandlerError::Validation(format!("Invalid query string: {}", e));
            return Err((err, ctx));
        }
    }

    let bytes = match body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let err = HandlerError::Validation(format!("Unreadable request body: {}", e));
            return Err((err, ctx));
        }
    };

    if !bytes.is_empty() {
        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => ctx.body = Some(text),
            Err(_) => {
                let err = HandlerError::Validation("Request body must be UTF-8".to_string());
                return Err((err, ctx));
            }
        }
    }

    Ok(ctx)
}

fn into_http(response: HandlerResponse) -> Response {
    let mut http_response = (response.status, Body::from(response.body)).into_response();
    let headers = http_response.headers_mut();

    for (name, value) in response.headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid response header"),
        }
    }

    http_response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use std::time::Instant;

    fn meta() -> InvocationMeta {
        InvocationMeta {
            function_name: "f".to_string(),
            function_version: "1".to_string(),
            memory_limit_mb: 128,
            deadline: Instant::now() + Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_context_from_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/trees?species=oak&detailed=true")
            .header("Authorization", "Bearer t")
            .body(Body::from(r#"{"height":3}"#))
            .unwrap();

        let ctx = build_context("id-1".to_string(), meta(), request).await.unwrap();
        assert_eq!(ctx.method, Method::POST);
        assert_eq!(ctx.path, "/trees");
        assert_eq!(ctx.query("species"), Some("oak"));
        assert_eq!(ctx.query("detailed"), Some("true"));
        assert_eq!(ctx.header("authorization"), Some("Bearer t"));
        assert_eq!(ctx.body.as_deref(), Some(r#"{"height":3}"#));
    }

    #[tokio::test]
    async fn test_empty_body_is_none() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let ctx = build_context("id-2".to_string(), meta(), request).await.unwrap();
        assert!(ctx.body.is_none());
        assert!(ctx.query.is_empty());
    }

    #[tokio::test]
    async fn test_non_utf8_body_is_validation_error() {
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/")
            .body(Body::from(vec![0xff, 0xfe]))
            .unwrap();
        let (err, ctx) = build_context("id-3".to_string(), meta(), request)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ctx.request_id, "id-3");
    }

    #[test]
    fn test_into_http_copies_headers() {
        let response = HandlerResponse::empty(StatusCode::OK)
            .with_header("X-Tree", "oak")
            .with_header("Bad Header", "x");
        let http_response = into_http(response);
        assert_eq!(http_response.status(), StatusCode::OK);
        assert_eq!(http_response.headers()["x-tree"], "oak");
        assert_eq!(http_response.headers().len(), 1);
    }
}
