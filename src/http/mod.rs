//! HTTP server module.
//!
//! Serves the handler router over plain HTTP. TLS termination is left to the
//! load balancer or API gateway in front of the host.
//!
//! The server includes graceful shutdown on SIGTERM/SIGINT with a bounded
//! connection-draining window.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
