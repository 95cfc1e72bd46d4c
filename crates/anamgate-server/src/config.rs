use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use anamgate_auth::token::SigningAlgorithm;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Session token configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Hospital portal endpoint configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        // Auth validations
        if self.auth.secret_key.is_empty() {
            return Err("auth.secret_key must not be empty".into());
        }
        if SigningAlgorithm::from_name(&self.auth.algorithm).is_none() {
            return Err("auth.algorithm must be one of HS256, HS384, HS512".into());
        }
        if self.auth.access_token_expire_minutes <= 0 {
            return Err("auth.access_token_expire_minutes must be > 0".into());
        }
        // Upstream validations
        if url::Url::parse(&self.upstream.base_url).is_err() {
            return Err("upstream.base_url must be a valid URL".into());
        }
        if self.upstream.default_facility.is_empty() {
            return Err("upstream.default_facility must not be empty".into());
        }
        if self.upstream.connect_timeout_ms == 0 || self.upstream.request_timeout_ms == 0 {
            return Err("upstream timeouts must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Session token settings.
///
/// Issued tokens embed the caller's portal credentials in their signed
/// payload: whoever holds `secret_key` can recover every password that ever
/// went into a token. There is no server-side session table and no
/// revocation list; a leaked token stays usable until its expiry. Treat the
/// key as production secret material and keep the TTL short.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric signing key. Override in production.
    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    /// HMAC signing algorithm name (HS256, HS384, HS512).
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Token lifetime in minutes.
    #[serde(default = "default_token_ttl_minutes")]
    pub access_token_expire_minutes: i64,
}

fn default_secret_key() -> String {
    "your-super-secret-key-change-in-production".into()
}
fn default_algorithm() -> String {
    "HS256".into()
}
fn default_token_ttl_minutes() -> i64 {
    60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            algorithm: default_algorithm(),
            access_token_expire_minutes: default_token_ttl_minutes(),
        }
    }
}

impl AuthConfig {
    /// The parsed signing algorithm. Falls back to HS256; `validate()`
    /// rejects unknown names before this is ever reached at runtime.
    #[must_use]
    pub fn signing_algorithm(&self) -> SigningAlgorithm {
        SigningAlgorithm::from_name(&self.algorithm).unwrap_or(SigningAlgorithm::HS256)
    }
}

/// Hospital portal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Portal base URL.
    #[serde(default = "default_portal_url")]
    pub base_url: String,

    /// Facility (hospital branch) code substituted when a query omits one.
    #[serde(default = "default_facility")]
    pub default_facility: String,

    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Per-request timeout in milliseconds. The only timeout between the
    /// gateway and the portal; there are no retries.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_portal_url() -> String {
    "https://mobile.anam.kumc.or.kr".into()
}
fn default_facility() -> String {
    "AA".into()
}
fn default_connect_timeout() -> u64 {
    5000
}
fn default_request_timeout() -> u64 {
    15_000
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_portal_url(),
            default_facility: default_facility(),
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                // Try default root-level file
                let default_path = PathBuf::from("anamgate.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., ANAMGATE__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("ANAMGATE")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
