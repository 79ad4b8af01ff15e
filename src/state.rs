//! Shared application state for the HTTP host.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{AppConfig, HandlerConfig};
use crate::health::HealthHandler;
use crate::probes::Dependencies;

/// Shared application state, cloneable across routes via Arc-wrapped fields.
///
/// Handlers are built once at startup; the stage/region pair is resolved
/// before construction and never re-read.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub handler_config: Arc<HandlerConfig>,
    pub health: Arc<HealthHandler>,
}

impl AppState {
    pub fn new(config: AppConfig, handler_config: HandlerConfig, deps: Dependencies) -> Self {
        let health = HealthHandler::new(deps, handler_config.clone(), Instant::now());
        Self {
            config: Arc::new(config),
            handler_config: Arc::new(handler_config),
            health: Arc::new(health),
        }
    }
}
