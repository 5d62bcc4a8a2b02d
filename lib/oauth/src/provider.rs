//! OAuth2 provider capability and the authorization-code implementation.

use async_trait::async_trait;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl, basic::BasicClient,
};

use crate::error::ProviderError;

/// Google OAuth authorization URL.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Google OAuth token URL.
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Google userinfo endpoint.
const GOOGLE_PROFILE_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Spotify OAuth authorization URL.
const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";

/// Spotify OAuth token URL.
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Spotify profile endpoint.
const SPOTIFY_PROFILE_URL: &str = "https://api.spotify.com/v1/me";

/// Provider-issued bearer token obtained from the code exchange.
///
/// Only lives long enough to fetch the profile; gatehouse never stores it.
#[derive(Clone)]
pub struct ProviderToken {
    access_token: String,
}

impl ProviderToken {
    /// Wraps a provider access token.
    #[must_use]
    pub fn new(access_token: String) -> Self {
        Self { access_token }
    }

    /// Returns the raw bearer token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for ProviderToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the token through Debug output.
        f.debug_struct("ProviderToken").finish_non_exhaustive()
    }
}

/// One external identity provider, as consumed by the login and callback
/// handlers.
///
/// Implementations are stateless beyond their static configuration; the
/// CSRF state is generated and verified by the caller.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The provider's name, stamped onto decoded profiles.
    fn name(&self) -> &str;

    /// Path component of the redirect URL, used to scope the state cookie.
    fn callback_path(&self) -> &str;

    /// Builds the provider authorization URL with the given state embedded.
    fn auth_code_url(&self, state: &str) -> String;

    /// Exchanges an authorization code for a provider token.
    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, ProviderError>;

    /// Fetches the raw profile response for the given provider token.
    async fn fetch_profile(&self, token: &ProviderToken) -> Result<Vec<u8>, ProviderError>;
}

/// Authorization-code grant implementation over the `oauth2` crate.
///
/// Covers any provider with standard authorize/token endpoints and a
/// bearer-authenticated profile endpoint.
pub struct OAuth2Provider {
    name: String,
    profile_url: String,
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
    redirect_url: String,
    callback_path: String,
    scopes: Vec<String>,
}

impl OAuth2Provider {
    /// Creates a provider from endpoint URLs and client credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] if any URL is invalid.
    pub fn new(
        name: &str,
        profile_url: &str,
        client_id: &str,
        client_secret: &str,
        auth_url: &str,
        token_url: &str,
        redirect_url: &str,
        scopes: &[&str],
    ) -> Result<Self, ProviderError> {
        // Validate URLs up front so the per-request builders cannot fail.
        let _ = AuthUrl::new(auth_url.to_string())
            .map_err(|e| ProviderError::Configuration(format!("invalid auth URL: {e}")))?;
        let _ = TokenUrl::new(token_url.to_string())
            .map_err(|e| ProviderError::Configuration(format!("invalid token URL: {e}")))?;
        let _ = RedirectUrl::new(redirect_url.to_string())
            .map_err(|e| ProviderError::Configuration(format!("invalid redirect URL: {e}")))?;

        let callback_path = reqwest::Url::parse(redirect_url)
            .map_err(|e| ProviderError::Configuration(format!("invalid redirect URL: {e}")))?
            .path()
            .to_string();

        Ok(Self {
            name: name.to_string(),
            profile_url: profile_url.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            auth_url: auth_url.to_string(),
            token_url: token_url.to_string(),
            redirect_url: redirect_url.to_string(),
            callback_path,
            scopes: scopes.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    /// Google provider with the well-known endpoints and `email openid`
    /// scopes.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] if the redirect URL is
    /// invalid.
    pub fn google(
        client_id: &str,
        client_secret: &str,
        redirect_url: &str,
    ) -> Result<Self, ProviderError> {
        Self::new(
            "google",
            GOOGLE_PROFILE_URL,
            client_id,
            client_secret,
            GOOGLE_AUTH_URL,
            GOOGLE_TOKEN_URL,
            redirect_url,
            &["email", "openid"],
        )
    }

    /// Spotify provider with the well-known endpoints and the
    /// `user-read-email` scope.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] if the redirect URL is
    /// invalid.
    pub fn spotify(
        client_id: &str,
        client_secret: &str,
        redirect_url: &str,
    ) -> Result<Self, ProviderError> {
        Self::new(
            "spotify",
            SPOTIFY_PROFILE_URL,
            client_id,
            client_secret,
            SPOTIFY_AUTH_URL,
            SPOTIFY_TOKEN_URL,
            redirect_url,
            &["user-read-email"],
        )
    }

    fn http_client(&self) -> Result<reqwest::Client, ProviderError> {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ProviderError::Configuration(format!("failed to create HTTP client: {e}")))
    }
}

#[async_trait]
impl Provider for OAuth2Provider {
    fn name(&self) -> &str {
        &self.name
    }

    fn callback_path(&self) -> &str {
        &self.callback_path
    }

    fn auth_code_url(&self, state: &str) -> String {
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(self.auth_url.clone()).expect("valid auth URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_url.clone()).expect("valid redirect URL"),
            );

        let state = CsrfToken::new(state.to_string());
        let mut auth_request = client.authorize_url(move || state);

        for scope in &self.scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }

        // Request offline access so providers that support it return a
        // refresh token alongside the access token.
        auth_request = auth_request.add_extra_param("access_type", "offline");

        let (auth_url, _) = auth_request.url();
        auth_url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, ProviderError> {
        let http_client = self.http_client()?;

        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_token_uri(TokenUrl::new(self.token_url.clone()).expect("valid token URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_url.clone()).expect("valid redirect URL"),
            );

        let token_response = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&http_client)
            .await
            .map_err(|e| ProviderError::Exchange(e.to_string()))?;

        Ok(ProviderToken::new(
            token_response.access_token().secret().clone(),
        ))
    }

    async fn fetch_profile(&self, token: &ProviderToken) -> Result<Vec<u8>, ProviderError> {
        let http_client = self.http_client()?;

        let response = http_client
            .get(&self.profile_url)
            .bearer_auth(token.access_token())
            .send()
            .await
            .map_err(|e| ProviderError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Fetch(format!(
                "profile request returned status {status}"
            )));
        }

        let raw = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Fetch(format!("failed to read response body: {e}")))?;

        Ok(raw.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> OAuth2Provider {
        OAuth2Provider::new(
            "example",
            "https://api.example.com/me",
            "client-id",
            "client-secret",
            "https://auth.example.com/authorize",
            "https://auth.example.com/token",
            "https://app.example.com/auth/example/callback",
            &["email"],
        )
        .expect("valid provider")
    }

    #[test]
    fn callback_path_comes_from_redirect_url() {
        let provider = test_provider();
        assert_eq!(provider.callback_path(), "/auth/example/callback");
    }

    #[test]
    fn auth_code_url_embeds_state_and_scopes() {
        let provider = test_provider();
        let url = provider.auth_code_url("random-state-value");

        assert!(url.starts_with("https://auth.example.com/authorize?"));
        assert!(url.contains("state=random-state-value"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("scope=email"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn invalid_auth_url_is_rejected() {
        let result = OAuth2Provider::new(
            "broken",
            "https://api.example.com/me",
            "client-id",
            "client-secret",
            "not a url",
            "https://auth.example.com/token",
            "https://app.example.com/callback",
            &[],
        );
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[test]
    fn google_provider_defaults() {
        let provider =
            OAuth2Provider::google("cid", "secret", "https://app.example.com/auth/google/callback")
                .expect("valid provider");

        assert_eq!(provider.name(), "google");
        assert_eq!(provider.callback_path(), "/auth/google/callback");
        let url = provider.auth_code_url("s");
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert!(url.contains("scope=email+openid") || url.contains("scope=email%20openid"));
    }

    #[test]
    fn spotify_provider_defaults() {
        let provider = OAuth2Provider::spotify(
            "cid",
            "secret",
            "https://app.example.com/auth/spotify/callback",
        )
        .expect("valid provider");

        assert_eq!(provider.name(), "spotify");
        assert_eq!(provider.callback_path(), "/auth/spotify/callback");
        assert!(
            provider
                .auth_code_url("s")
                .starts_with("https://accounts.spotify.com/authorize?")
        );
    }

    #[test]
    fn provider_token_debug_redacts_value() {
        let token = ProviderToken::new("very-secret".to_string());
        let debug = format!("{token:?}");
        assert!(!debug.contains("very-secret"));
    }
}
