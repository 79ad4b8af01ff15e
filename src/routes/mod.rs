//! HTTP routes exposing the handlers.
//!
//! Every route funnels through [`invoke::invoke`], so each response leaving
//! the host has passed through the request envelope. Health responses are
//! never cached. Unknown paths become envelope-mapped not-found failures.
//!
//! Request tracing is enabled via middleware that assigns a unique invocation
//! ID to each incoming request, allowing correlation of all logs within a
//! request.

pub mod invoke;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware,
    response::Response,
    routing::any,
    Extension, Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::HandlerError;
use crate::handler::{Handler, HandlerResponse, RequestContext};
use crate::middleware::{invocation_id_layer, InvocationId};
use crate::state::AppState;

/// Cache-Control for health responses: always fresh for liveness probes
pub const CACHE_CONTROL_HEALTH: &str = "no-store";

/// Handler for paths with no route.
pub struct RouteNotFound;

#[async_trait]
impl Handler for RouteNotFound {
    async fn handle(&self, ctx: &RequestContext) -> Result<HandlerResponse, HandlerError> {
        Err(HandlerError::NotFound(format!(
            "No route for {} {}",
            ctx.method, ctx.path
        )))
    }
}

async fn health(
    State(state): State<AppState>,
    Extension(invocation_id): Extension<InvocationId>,
    request: Request,
) -> Response {
    invoke::invoke(state.health.as_ref(), &state, &invocation_id, request).await
}

async fn not_found(
    State(state): State<AppState>,
    Extension(invocation_id): Extension<InvocationId>,
    request: Request,
) -> Response {
    invoke::invoke(&RouteNotFound, &state, &invocation_id, request).await
}

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Health check - all methods so OPTIONS pre-flight reaches the envelope
    let health_routes = Router::new()
        .route("/health", any(health))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_HEALTH),
        ));

    Router::new()
        .merge(health_routes)
        .fallback(not_found)
        .with_state(state)
        // Invocation ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(invocation_id_layer))
}
