//! Canopy - request handlers for the tree-care assistant backend.
//!
//! Provides the shared request envelope ([`handler`]), the dependency health
//! probe ([`health`]), the clients it probes ([`probes`]), and an axum host
//! that serves handlers over HTTP (`routes`, `http`).

pub mod config;
pub mod error;
pub mod handler;
pub mod health;
pub mod http;
pub mod middleware;
pub mod probes;
pub mod routes;
pub mod state;

pub use error::HandlerError;
pub use handler::{Handler, HandlerResponse, RequestContext};
