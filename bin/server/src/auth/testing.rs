//! Shared fixtures for handler tests: a stub provider, stub resolvers, and
//! a router wired the same way `main` wires the real one.

use async_trait::async_trait;
use axum::http::header;
use axum::response::Response;
use axum::{Router, routing::get};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use super::{AppState, ProviderFlow, RequireAuth, ResolveError, UserResolver, callback, login, refresh};
use crate::config::TransportConfig;
use gatehouse_oauth::{Provider, ProviderError, ProviderProfile, ProviderToken};
use gatehouse_token::{InMemoryTokenStore, JwtManager, StoreError, Subject, TokenStore};

/// Provider stub: accepts the code `good-code` and serves a canned profile.
pub(crate) struct StubProvider {
    pub profile: Vec<u8>,
    pub delay: Option<StdDuration>,
}

impl Default for StubProvider {
    fn default() -> Self {
        Self {
            profile: br#"{"id":"42","email":"a@b.com"}"#.to_vec(),
            delay: None,
        }
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn callback_path(&self) -> &str {
        "/auth/stub/callback"
    }

    fn auth_code_url(&self, state: &str) -> String {
        format!("https://provider.test/authorize?client_id=stub&state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if code == "good-code" {
            Ok(ProviderToken::new("provider-token".to_string()))
        } else {
            Err(ProviderError::Exchange("unknown code".to_string()))
        }
    }

    async fn fetch_profile(&self, _token: &ProviderToken) -> Result<Vec<u8>, ProviderError> {
        Ok(self.profile.clone())
    }
}

/// Resolver that always answers with the same subject.
pub(crate) struct StaticResolver(pub &'static str);

#[async_trait]
impl UserResolver for StaticResolver {
    async fn resolve(&self, _profile: ProviderProfile) -> Result<Subject, ResolveError> {
        Ok(Subject::from(self.0))
    }
}

/// Resolver that always fails, for exercising the 500 path.
pub(crate) struct FailingResolver;

#[async_trait]
impl UserResolver for FailingResolver {
    async fn resolve(&self, _profile: ProviderProfile) -> Result<Subject, ResolveError> {
        Err("resolver exploded".into())
    }
}

/// Store whose backend is always down, for exercising the 500 paths.
pub(crate) struct UnavailableStore;

#[async_trait]
impl TokenStore for UnavailableStore {
    async fn store(&self, _subject: &Subject, _token: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable {
            reason: "backend offline".to_string(),
        })
    }

    async fn current(&self, _subject: &Subject) -> Result<String, StoreError> {
        Err(StoreError::Unavailable {
            reason: "backend offline".to_string(),
        })
    }
}

/// Default test application: stub provider, subject `u1`, generous timeout.
pub(crate) fn test_app() -> (Arc<AppState>, Router) {
    test_app_with(
        StubProvider::default(),
        Arc::new(StaticResolver("u1")),
        StdDuration::from_secs(5),
    )
}

/// Test application with a custom provider, resolver, and handler timeout.
pub(crate) fn test_app_with(
    provider: StubProvider,
    resolver: Arc<dyn UserResolver>,
    handler_timeout: StdDuration,
) -> (Arc<AppState>, Router) {
    build_app(
        provider,
        resolver,
        Arc::new(InMemoryTokenStore::new()),
        default_transport(),
        handler_timeout,
    )
}

/// Test application with a custom token store.
pub(crate) fn test_app_with_store(store: Arc<dyn TokenStore>) -> (Arc<AppState>, Router) {
    build_app(
        StubProvider::default(),
        Arc::new(StaticResolver("u1")),
        store,
        default_transport(),
        StdDuration::from_secs(5),
    )
}

/// Test application with custom transport settings.
pub(crate) fn test_app_with_transport(transport: TransportConfig) -> (Arc<AppState>, Router) {
    build_app(
        StubProvider::default(),
        Arc::new(StaticResolver("u1")),
        Arc::new(InMemoryTokenStore::new()),
        transport,
        StdDuration::from_secs(5),
    )
}

fn default_transport() -> TransportConfig {
    TransportConfig {
        secure_cookies: false,
        ..TransportConfig::default()
    }
}

fn build_app(
    provider: StubProvider,
    resolver: Arc<dyn UserResolver>,
    store: Arc<dyn TokenStore>,
    transport: TransportConfig,
    handler_timeout: StdDuration,
) -> (Arc<AppState>, Router) {
    let jwt = JwtManager::new(
        "gatehouse-test".to_string(),
        "test-secret",
        chrono::Duration::minutes(15),
        chrono::Duration::days(30),
    );
    let app = Arc::new(AppState::new(jwt, store, resolver, transport, handler_timeout));

    let flow = ProviderFlow {
        app: app.clone(),
        provider: Arc::new(provider),
    };
    let router = Router::new()
        .route("/auth/stub", get(login))
        .route("/auth/stub/callback", get(callback))
        .with_state(flow)
        .merge(
            Router::new()
                .route("/auth/refresh", get(refresh))
                .route("/protected", get(protected))
                .with_state(app.clone()),
        );

    (app, router)
}

async fn protected(RequireAuth(subject): RequireAuth) -> String {
    format!("hello, {subject}")
}

/// Returns the value of the named cookie from the response's Set-Cookie
/// headers, if any.
pub(crate) fn cookie_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|raw| {
            let pair = raw.split(';').next()?;
            let (cookie_name, value) = pair.split_once('=')?;
            (cookie_name == name).then(|| value.to_string())
        })
}

/// Extracts the `state` query parameter from an authorization URL.
pub(crate) fn state_param(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("state=")?;
    Some(rest.split('&').next().unwrap_or(rest).to_string())
}
