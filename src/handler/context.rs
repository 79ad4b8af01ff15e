//! Per-invocation request context.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use http::Method;
use serde::de::DeserializeOwned;

use crate::error::HandlerError;

/// Identity and limits of the function serving an invocation.
#[derive(Debug, Clone)]
pub struct InvocationMeta {
    pub function_name: String,
    pub function_version: String,
    pub memory_limit_mb: u32,
    /// Point in time after which the host abandons the invocation
    pub deadline: Instant,
}

impl InvocationMeta {
    /// Time left before the deadline, zero once it has passed.
    pub fn remaining_time(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

/// Everything a handler knows about the request it is serving.
///
/// Built once by the host and only read afterwards.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub method: Method,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
    pub invocation: InvocationMeta,
}

impl RequestContext {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Deserialize the JSON body. A missing or malformed body is a
    /// validation failure.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        let body = self
            .body
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| HandlerError::Validation("Request body is required".to_string()))?;

        serde_json::from_str(body)
            .map_err(|e| HandlerError::Validation(format!("Invalid request body: {}", e)))
    }
}
