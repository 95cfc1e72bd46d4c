use std::sync::Arc;

use axum::extract::FromRef;

use anamgate_auth::{AuthState, TokenService};
use anamgate_upstream::PortalConnector;

use crate::config::AppConfig;

/// Shared, read-only application state.
///
/// Nothing here is mutated after startup; every request works against its
/// own portal session and carries its own credentials.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthState,
    pub portal: Arc<dyn PortalConnector>,
}

impl AppState {
    /// Builds the state from a validated configuration and a portal
    /// connector.
    pub fn new(config: AppConfig, portal: Arc<dyn PortalConnector>) -> Self {
        let tokens = Arc::new(TokenService::new(
            &config.auth.secret_key,
            config.auth.signing_algorithm(),
            config.auth.access_token_expire_minutes,
        ));
        Self {
            config: Arc::new(config),
            auth: AuthState::new(tokens),
            portal,
        }
    }

    /// The facility code to use when a query omits one.
    #[must_use]
    pub fn default_facility(&self) -> &str {
        &self.config.upstream.default_facility
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
