//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.

use serde::Deserialize;

/// Server configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Token issuance configuration.
    pub auth: AuthConfig,

    /// Cookie and header transport configuration.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Google OAuth credentials. Routes are only mounted when present.
    pub google: Option<ProviderCredentials>,

    /// Spotify OAuth credentials. Routes are only mounted when present.
    pub spotify: Option<ProviderCredentials>,
}

/// Token issuance configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Issuer string stamped into every session token.
    pub issuer: String,

    /// HS256 signing secret. Single secret, single trust domain.
    pub secret: String,

    /// Access token lifetime in minutes.
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,

    /// Refresh token lifetime in days.
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,

    /// Upper bound in seconds on provider network calls per callback.
    #[serde(default = "default_handler_timeout_seconds")]
    pub handler_timeout_seconds: u64,
}

/// Cookie names, header names, and cookie security flags.
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Name of the CSRF state cookie set during login.
    #[serde(default = "default_state_cookie")]
    pub state_cookie: String,

    /// Name of the access token cookie.
    #[serde(default = "default_access_cookie")]
    pub access_cookie: String,

    /// Name of the refresh token cookie.
    #[serde(default = "default_refresh_cookie")]
    pub refresh_cookie: String,

    /// State cookie lifetime in minutes. One login attempt only.
    #[serde(default = "default_state_ttl_minutes")]
    pub state_ttl_minutes: i64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local
    /// HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,

    /// Header carrying the access token (`Bearer <token>` on requests).
    #[serde(default = "default_access_header")]
    pub access_header: String,

    /// Header carrying the refresh token.
    #[serde(default = "default_refresh_header")]
    pub refresh_header: String,

    /// Deliver tokens from the callback via headers instead of cookies.
    #[serde(default)]
    pub header_tokens: bool,
}

/// OAuth client credentials for one provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_access_ttl_minutes() -> i64 {
    15
}

fn default_refresh_ttl_days() -> i64 {
    30
}

fn default_handler_timeout_seconds() -> u64 {
    5
}

fn default_state_cookie() -> String {
    "oauth_state".to_string()
}

fn default_access_cookie() -> String {
    "access_token".to_string()
}

fn default_refresh_cookie() -> String {
    "refresh_token".to_string()
}

fn default_state_ttl_minutes() -> i64 {
    5
}

fn default_secure_cookies() -> bool {
    true
}

fn default_access_header() -> String {
    "Authorization".to_string()
}

fn default_refresh_header() -> String {
    "Refresh-Token".to_string()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            state_cookie: default_state_cookie(),
            access_cookie: default_access_cookie(),
            refresh_cookie: default_refresh_cookie(),
            state_ttl_minutes: default_state_ttl_minutes(),
            secure_cookies: default_secure_cookies(),
            access_header: default_access_header(),
            refresh_header: default_refresh_header(),
            header_tokens: false,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
