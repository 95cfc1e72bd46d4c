//! # anamgate-server
//!
//! HTTP gateway for the hospital portal: one login endpoint that trades
//! portal credentials for a session token, eight read-only query endpoints
//! that replay those credentials against the portal per request, and a
//! health probe. No state survives a request.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod state;

pub use config::{AppConfig, AuthConfig, LoggingConfig, ServerConfig, UpstreamConfig};
pub use observability::{apply_logging_level, init_tracing};
pub use server::{AnamgateServer, ServerBuilder, build_app};
pub use state::AppState;
