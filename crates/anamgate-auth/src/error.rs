//! HTTP-facing authentication errors.
//!
//! Every token failure on a protected endpoint maps to HTTP 401 with a
//! fixed localized message; the specific failure reason stays in the logs.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::token::TokenError;

/// Errors produced while authenticating a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request carries no `Authorization` header.
    #[error("Missing Authorization header")]
    MissingAuthorization,

    /// The `Authorization` header is not a Bearer token.
    #[error("Invalid Authorization header format")]
    MalformedHeader,

    /// The token is invalid, expired, or tampered with.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token was rejected.
        message: String,
    },

    /// The token verified but does not carry the credential claims.
    #[error("Missing required claim: {claim}")]
    MissingClaims {
        /// Name of the missing claim.
        claim: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// The localized message sent to the caller.
    #[must_use]
    pub fn detail(&self) -> &'static str {
        match self {
            Self::MissingClaims { .. } => "인증 정보를 확인할 수 없습니다.",
            _ => "유효하지 않은 인증 토큰입니다.",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingClaim { claim } => Self::MissingClaims { claim },
            other => Self::invalid_token(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "request authentication rejected");

        let body = Json(json!({ "detail": self.detail() }));
        let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}
