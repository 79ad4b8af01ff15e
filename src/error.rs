//! Failure taxonomy for request handlers.
//!
//! Each variant carries a fixed status code and kind string. The request
//! envelope is the only place these are turned into responses.

use std::error::Error as StdError;

use http::StatusCode;

/// Boxed error kept as the source of an internal failure
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(#[source] BoxError),
}

impl HandlerError {
    /// Wrap any unexpected failure.
    pub fn internal<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        HandlerError::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Validation(_) => StatusCode::BAD_REQUEST,
            HandlerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HandlerError::Forbidden(_) => StatusCode::FORBIDDEN,
            HandlerError::NotFound(_) => StatusCode::NOT_FOUND,
            HandlerError::Conflict(_) => StatusCode::CONFLICT,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Kind string reported in the `error` field of failure bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::Validation(_) => "ValidationError",
            HandlerError::Unauthorized(_) => "UnauthorizedError",
            HandlerError::Forbidden(_) => "ForbiddenError",
            HandlerError::NotFound(_) => "NotFoundError",
            HandlerError::Conflict(_) => "ConflictError",
            HandlerError::Internal(_) => "InternalServerError",
        }
    }

    /// Message safe to show callers. Internal details never leave the process
    /// through this path.
    pub fn public_message(&self) -> String {
        match self {
            HandlerError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Debug rendering followed by every `source()` in the chain.
    pub fn trace(&self) -> Vec<String> {
        let mut lines = vec![format!("{:?}", self)];
        let mut source = self.source();
        while let Some(err) = source {
            lines.push(format!("caused by: {}", err));
            source = err.source();
        }
        lines
    }
}
