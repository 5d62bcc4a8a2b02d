//! Provider profile decoding.

use serde::Deserialize;

use crate::error::ProviderError;

/// Identity fields fetched from the provider, handed to the host's
/// user-resolution callback and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Name of the provider that authenticated the user.
    pub provider: String,
    /// The provider's own id for the user.
    pub id: String,
    /// Email address reported by the provider.
    pub email: String,
}

/// Shape of the profile endpoint response. Both Google's userinfo and
/// Spotify's `/v1/me` expose `id` and `email` at the top level.
#[derive(Deserialize)]
struct RawProfile {
    #[serde(default)]
    id: String,
    #[serde(default)]
    email: String,
}

impl ProviderProfile {
    /// Decodes a raw profile response and stamps the provider name.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Decode`] when the payload is not valid JSON
    /// or either required field is missing or empty.
    pub fn from_raw(provider: &str, raw: &[u8]) -> Result<Self, ProviderError> {
        let parsed: RawProfile = serde_json::from_slice(raw)
            .map_err(|e| ProviderError::Decode(format!("invalid profile JSON: {e}")))?;

        if parsed.id.is_empty() {
            return Err(ProviderError::Decode("missing user id".to_string()));
        }
        if parsed.email.is_empty() {
            return Err(ProviderError::Decode("missing email".to_string()));
        }

        Ok(Self {
            provider: provider.to_string(),
            id: parsed.id,
            email: parsed.email,
        })
    }
}
