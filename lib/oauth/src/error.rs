//! Error types for provider operations.

use std::fmt;

/// Errors from an OAuth2 provider.
#[derive(Debug)]
pub enum ProviderError {
    /// Invalid static configuration (URLs, credentials).
    Configuration(String),
    /// The code-for-token exchange failed.
    Exchange(String),
    /// The profile fetch failed (network error or non-2xx response).
    Fetch(String),
    /// The profile response could not be decoded into the required fields.
    Decode(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "provider configuration error: {msg}"),
            Self::Exchange(msg) => write!(f, "code exchange failed: {msg}"),
            Self::Fetch(msg) => write!(f, "profile fetch failed: {msg}"),
            Self::Decode(msg) => write!(f, "profile decode failed: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}
