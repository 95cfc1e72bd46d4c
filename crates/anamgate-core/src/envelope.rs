//! Uniform response envelope.
//!
//! Every business endpoint answers with the same `{success, message, data}`
//! shape. Upstream payloads pass through verbatim as untyped JSON; their
//! schema is owned by the portal, not by this gateway.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{success, message, data}` wrapper returned by every query endpoint.
///
/// On failure `data` is absent and `message` is non-empty. On success `data`
/// holds the upstream result verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiEnvelope {
    pub success: bool,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiEnvelope {
    /// Wraps an upstream payload in a success envelope.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            message: String::new(),
            data: Some(data),
        }
    }

    /// Builds a failure envelope carrying the stringified failure.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Login response: the envelope plus the issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".into()
}

impl LoginResponse {
    /// Successful sign-in carrying the freshly issued token.
    #[must_use]
    pub fn authenticated(message: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            access_token: Some(access_token.into()),
            token_type: default_token_type(),
        }
    }

    /// Rejected sign-in. No token is issued.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            access_token: None,
            token_type: default_token_type(),
        }
    }
}
