//! # anamgate-upstream
//!
//! Hospital portal client for the anamgate gateway.
//!
//! The gateway treats the portal as an opaque collaborator: it signs in with
//! the caller's credentials, performs exactly one read-only query per
//! request, and tears the portal session down before answering. This crate
//! provides that seam:
//!
//! - [`PortalConnector`] / [`PortalSession`] - the trait pair every handler
//!   works against. Credentials are passed explicitly to `connect`; nothing
//!   flows through process environment or shared state.
//! - [`HttpPortal`] - the reqwest-backed implementation speaking the
//!   portal's mobile-web API (cookie-bound session, 8-digit numeric dates,
//!   portal field names on the wire).
//!
//! Query results come back as untyped [`serde_json::Value`]; their schema
//! belongs to the portal.

pub mod error;
pub mod http;
pub mod portal;

pub use error::PortalError;
pub use http::HttpPortal;
pub use portal::{CareKind, PortalConnector, PortalSession};
