//! Response record produced by handlers.

use std::collections::HashMap;

use http::StatusCode;
use serde::Serialize;

use crate::config::{
    CONTENT_TYPE_JSON, CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_ALLOW_ORIGIN, CORS_MAX_AGE,
};
use crate::error::HandlerError;

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const HEADER_ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const HEADER_ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const HEADER_MAX_AGE: &str = "Access-Control-Max-Age";

/// Headers forced onto every response leaving the envelope
pub const FIXED_HEADERS: [(&str, &str); 4] = [
    (HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON),
    (HEADER_ALLOW_ORIGIN, CORS_ALLOW_ORIGIN),
    (HEADER_ALLOW_METHODS, CORS_ALLOW_METHODS),
    (HEADER_ALLOW_HEADERS, CORS_ALLOW_HEADERS),
];

#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HandlerResponse {
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    /// Serialize `value` as the body.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, HandlerError> {
        let body = serde_json::to_string(value).map_err(HandlerError::internal)?;
        Ok(Self {
            status,
            headers: HashMap::new(),
            body,
        })
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name.into(), value.into());
        self
    }

    /// Pre-flight answer: no content, permission headers, cache lifetime.
    pub fn preflight() -> Self {
        Self::empty(StatusCode::NO_CONTENT).with_fixed_headers()
    }

    /// Force the fixed header set, replacing any same-named header
    /// regardless of case. No-content responses also get the cache lifetime.
    pub fn with_fixed_headers(mut self) -> Self {
        for (name, value) in FIXED_HEADERS {
            self.set_header(name.to_string(), value.to_string());
        }
        if self.status == StatusCode::NO_CONTENT {
            self.set_header(HEADER_MAX_AGE.to_string(), CORS_MAX_AGE.to_string());
        }
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn set_header(&mut self, name: String, value: String) {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preflight_shape() {
        let resp = HandlerResponse::preflight();
        assert_eq!(resp.status, StatusCode::NO_CONTENT);
        assert!(resp.body.is_empty());
        assert_eq!(resp.header("access-control-max-age"), Some("86400"));
        for (name, value) in FIXED_HEADERS {
            assert_eq!(resp.header(name), Some(value));
        }
    }

    #[test]
    fn test_fixed_headers_override_case_insensitively() {
        let resp = HandlerResponse::empty(StatusCode::OK)
            .with_header("content-type", "text/plain")
            .with_header("ACCESS-CONTROL-ALLOW-ORIGIN", "https://evil.example")
            .with_header("X-Trace", "abc")
            .with_fixed_headers();

        assert_eq!(resp.header("Content-Type"), Some(CONTENT_TYPE_JSON));
        assert_eq!(resp.header(HEADER_ALLOW_ORIGIN), Some("*"));
        assert_eq!(resp.header("x-trace"), Some("abc"));
        // One entry per header name, no stale duplicates
        assert_eq!(resp.headers.len(), 5);
    }

    #[test]
    fn test_no_content_gets_max_age() {
        let resp = HandlerResponse::empty(StatusCode::NO_CONTENT)
            .with_header("access-control-max-age", "5")
            .with_fixed_headers();
        assert_eq!(resp.header(HEADER_MAX_AGE), Some(CORS_MAX_AGE));

        let resp = HandlerResponse::empty(StatusCode::OK).with_fixed_headers();
        assert!(resp.header(HEADER_MAX_AGE).is_none());
    }

    #[test]
    fn test_json_body() {
        let resp = HandlerResponse::json(StatusCode::CREATED, &serde_json::json!({"id": 7})).unwrap();
        assert_eq!(resp.status, StatusCode::CREATED);
        assert_eq!(resp.body, r#"{"id":7}"#);
    }
}
