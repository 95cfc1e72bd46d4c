//! Portal client error types.

/// Errors that can occur while talking to the hospital portal.
///
/// At the gateway boundary all of these collapse into the failure
/// envelope's message string; the variants exist for logging and tests.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// The portal rejected the sign-in credentials.
    #[error("Sign-in rejected: {message}")]
    SignIn {
        /// Portal-supplied rejection reason.
        message: String,
    },

    /// The portal answered a query with an error reply.
    #[error("Portal error: {message}")]
    Portal {
        /// Portal-supplied error description.
        message: String,
    },

    /// The portal reply did not have the expected shape.
    #[error("Unexpected portal reply: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },

    /// Network-level failure talking to the portal.
    #[error("Portal request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PortalError {
    /// Creates a new `SignIn` error.
    #[must_use]
    pub fn sign_in(message: impl Into<String>) -> Self {
        Self::SignIn {
            message: message.into(),
        }
    }

    /// Creates a new `Portal` error.
    #[must_use]
    pub fn portal(message: impl Into<String>) -> Self {
        Self::Portal {
            message: message.into(),
        }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns `true` if the portal rejected the caller's credentials.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::SignIn { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_portal_message() {
        let err = PortalError::sign_in("아이디 또는 비밀번호가 일치하지 않습니다.");
        assert!(err.to_string().contains("일치하지"));
        assert!(err.is_auth_failure());

        let err = PortalError::portal("maintenance window");
        assert!(!err.is_auth_failure());
    }
}
