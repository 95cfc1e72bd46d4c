//! Portal credentials.
//!
//! Credentials exist only transiently: they arrive in the login request,
//! travel inside the signed session token, and are reconstructed from the
//! token on every authenticated request. They are never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A portal identifier/secret pair.
///
/// The `Debug` implementation redacts the secret so credentials can appear
/// in tracing fields without leaking the password.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Portal member identifier.
    pub identifier: String,

    /// Portal password.
    pub secret: String,
}

impl Credentials {
    /// Creates a new credentials pair.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Returns `true` if either field is empty.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.identifier.is_empty() || self.secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret() {
        let credentials = Credentials::new("u1", "hunter2");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("u1"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn incomplete_when_either_field_empty() {
        assert!(Credentials::new("", "pw").is_incomplete());
        assert!(Credentials::new("id", "").is_incomplete());
        assert!(!Credentials::new("id", "pw").is_incomplete());
    }
}
