//! # anamgate-auth
//!
//! Session token issuance and validation for the anamgate gateway.
//!
//! This crate provides:
//! - Signed, time-limited session tokens that embed the caller's portal
//!   credentials (HMAC-signed JWTs on a symmetric process key)
//! - An axum extractor that turns `Authorization: Bearer <token>` back into
//!   [`anamgate_core::Credentials`] on every protected request
//! - HTTP error mapping for rejected tokens (always 401, fixed message)
//!
//! There is no revocation mechanism and no server-side session state: a
//! token stays valid for its whole TTL, and each request re-authenticates
//! against the portal with the credentials recovered from the token.
//!
//! ## Modules
//!
//! - [`token`] - Token service: issue and decode session tokens
//! - [`extract`] - `BearerAuth` extractor and its `AuthState`
//! - [`error`] - HTTP-facing authentication errors

pub mod error;
pub mod extract;
pub mod token;

pub use error::AuthError;
pub use extract::{AuthState, BearerAuth};
pub use token::{SessionClaims, SigningAlgorithm, TokenError, TokenService};
