//! Session token generation and validation.
//!
//! Tokens are JWTs signed with a symmetric key fixed at process start. The
//! payload embeds the caller's portal credentials so that every subsequent
//! request can re-authenticate against the portal without any server-side
//! session table. The token is valid only while its signature verifies and
//! its expiry has not passed.
//!
//! ## Example
//!
//! ```ignore
//! use anamgate_auth::token::{SigningAlgorithm, TokenService};
//! use anamgate_core::Credentials;
//!
//! let service = TokenService::new("secret", SigningAlgorithm::HS256, 60);
//! let token = service.issue(&Credentials::new("u1", "p1"))?;
//! let credentials = service.decode(&token)?;
//! ```

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use anamgate_core::Credentials;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while issuing or validating session tokens.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature does not verify.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token or its payload could not be parsed.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the parse failure.
        message: String,
    },

    /// A required claim is absent from an otherwise valid token.
    #[error("Missing required claim: {claim}")]
    MissingClaim {
        /// Name of the missing claim.
        claim: String,
    },

    /// Failed to sign a token.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding failure.
        message: String,
    },
}

impl TokenError {
    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new `MissingClaim` error.
    #[must_use]
    pub fn missing_claim(claim: impl Into<String>) -> Self {
        Self::MissingClaim {
            claim: claim.into(),
        }
    }

    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Returns `true` when the token itself is at fault (as opposed to a
    /// signing failure on our side).
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Encoding { .. })
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::MissingRequiredClaim(claim) => Self::missing_claim(claim.clone()),
            _ => Self::malformed(err.to_string()),
        }
    }
}

// ============================================================================
// Signing Algorithm
// ============================================================================

/// Supported signing algorithms.
///
/// Tokens are signed with a symmetric process key, so only the HMAC family
/// is accepted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256 (default).
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
}

impl SigningAlgorithm {
    /// Parses an algorithm name from configuration.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "HS256" => Some(Self::HS256),
            "HS384" => Some(Self::HS384),
            "HS512" => Some(Self::HS512),
            _ => None,
        }
    }

    /// Converts to the `jsonwebtoken` Algorithm type.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> Algorithm {
        match self {
            Self::HS256 => Algorithm::HS256,
            Self::HS384 => Algorithm::HS384,
            Self::HS512 => Algorithm::HS512,
        }
    }

    /// Returns the algorithm name as used in JWT headers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// Claims carried inside a session token.
///
/// `sub` and `pwd` hold the portal credentials verbatim; the token is the
/// only place they survive between requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Portal member identifier.
    pub sub: String,

    /// Portal password.
    pub pwd: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl SessionClaims {
    /// Builds claims for the given credentials, expiring `ttl_seconds` from
    /// now. Negative values produce an already-expired token.
    #[must_use]
    pub fn new(credentials: &Credentials, ttl_seconds: i64) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            sub: credentials.identifier.clone(),
            pwd: credentials.secret.clone(),
            iat: now,
            exp: now + ttl_seconds,
        }
    }
}

/// Decoded payload before the credential claims are checked for presence.
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<String>,

    #[serde(default)]
    pwd: Option<String>,
}

// ============================================================================
// Token Service
// ============================================================================

/// Issues and validates session tokens on a symmetric key.
///
/// Key, algorithm, and TTL are fixed at construction; there is no runtime
/// rotation and no revocation list.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: SigningAlgorithm,
    ttl_seconds: i64,
}

impl TokenService {
    /// Creates a token service from the configured key, algorithm and TTL.
    #[must_use]
    pub fn new(secret: &str, algorithm: SigningAlgorithm, ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            ttl_seconds: ttl_minutes * 60,
        }
    }

    /// Signs a fresh token embedding the given credentials.
    ///
    /// Purely cryptographic packaging; no portal validation happens here.
    /// The caller is expected to have verified the credentials upstream
    /// before issuing.
    pub fn issue(&self, credentials: &Credentials) -> Result<String, TokenError> {
        self.encode(&SessionClaims::new(credentials, self.ttl_seconds))
    }

    /// Signs an explicit claims payload.
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        encode(
            &Header::new(self.algorithm.to_jwt_algorithm()),
            claims,
            &self.encoding_key,
        )
        .map_err(|e| TokenError::encoding(e.to_string()))
    }

    /// Verifies signature and expiry, then recovers the embedded credentials.
    pub fn decode(&self, token: &str) -> Result<Credentials, TokenError> {
        let mut validation = Validation::new(self.algorithm.to_jwt_algorithm());
        // exp is checked exactly; no clock leeway
        validation.leeway = 0;

        let data = decode::<RawClaims>(token, &self.decoding_key, &validation)?;

        let identifier = data
            .claims
            .sub
            .ok_or_else(|| TokenError::missing_claim("sub"))?;
        let secret = data
            .claims
            .pwd
            .ok_or_else(|| TokenError::missing_claim("pwd"))?;

        Ok(Credentials::new(identifier, secret))
    }
}
