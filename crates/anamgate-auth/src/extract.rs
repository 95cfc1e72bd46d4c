//! Bearer token extractor.
//!
//! Axum extractor that validates `Authorization: Bearer <token>` and hands
//! the handler the portal credentials recovered from the token payload.
//!
//! # Example
//!
//! ```ignore
//! use anamgate_auth::{AuthState, BearerAuth};
//!
//! async fn protected_handler(BearerAuth(credentials): BearerAuth) {
//!     // credentials.identifier / credentials.secret
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use anamgate_core::Credentials;

use crate::error::AuthError;
use crate::token::TokenService;

// =============================================================================
// Auth State
// =============================================================================

/// State required for bearer token authentication.
///
/// Include this in your application state and expose it to the extractor
/// via `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// Token service for decoding session tokens.
    pub tokens: Arc<TokenService>,
}

impl AuthState {
    /// Creates a new auth state.
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

// =============================================================================
// Bearer Auth Extractor
// =============================================================================

/// Axum extractor that validates the bearer token and yields the portal
/// credentials embedded in it.
///
/// Rejects with [`AuthError`] (HTTP 401) when the header is missing or
/// malformed, the signature does not verify, the token has expired, or the
/// credential claims are absent.
#[derive(Debug)]
pub struct BearerAuth(pub Credentials);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingAuthorization)?;

        let token = header
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MalformedHeader)?;

        let credentials = auth_state.tokens.decode(token).map_err(|e| {
            tracing::debug!(error = %e, "failed to decode session token");
            AuthError::from(e)
        })?;

        Ok(BearerAuth(credentials))
    }
}
