use axum::{Router, routing::get};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatehouse_oauth::{OAuth2Provider, Provider, ProviderProfile};
use gatehouse_server::{
    auth::{self, AppState, ProviderFlow, RequireAuth, ResolveError, UserResolver},
    config::ServerConfig,
};
use gatehouse_token::{InMemoryTokenStore, JwtManager, Subject};

/// Demo resolver: the subject is the provider name concatenated with the
/// provider-assigned id. A real deployment would look the profile up in its
/// user database here.
struct PassthroughResolver;

#[async_trait::async_trait]
impl UserResolver for PassthroughResolver {
    async fn resolve(&self, profile: ProviderProfile) -> Result<Subject, ResolveError> {
        Ok(Subject::from(format!("{}{}", profile.provider, profile.id)))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let jwt = JwtManager::new(
        config.auth.issuer.clone(),
        &config.auth.secret,
        chrono::Duration::minutes(config.auth.access_ttl_minutes),
        chrono::Duration::days(config.auth.refresh_ttl_days),
    );

    let app_state = Arc::new(AppState::new(
        jwt,
        Arc::new(InMemoryTokenStore::new()),
        Arc::new(PassthroughResolver),
        config.transport.clone(),
        std::time::Duration::from_secs(config.auth.handler_timeout_seconds),
    ));

    let mut app = Router::new()
        .route("/auth/refresh", get(auth::refresh))
        .route("/protected", get(protected))
        .with_state(app_state.clone());

    // Mount a login/callback pair for each provider with credentials.
    if let Some(credentials) = &config.google {
        let provider = OAuth2Provider::google(
            &credentials.client_id,
            &credentials.client_secret,
            &credentials.redirect_url,
        )
        .expect("invalid google configuration");
        app = app.merge(provider_router(
            "/auth/google",
            provider,
            app_state.clone(),
        ));
    }
    if let Some(credentials) = &config.spotify {
        let provider = OAuth2Provider::spotify(
            &credentials.client_id,
            &credentials.client_secret,
            &credentials.redirect_url,
        )
        .expect("invalid spotify configuration");
        app = app.merge(provider_router(
            "/auth/spotify",
            provider,
            app_state.clone(),
        ));
    }
    if config.google.is_none() && config.spotify.is_none() {
        tracing::warn!("no provider credentials configured; only /auth/refresh is available");
    }

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}

/// Builds the login and callback routes for one provider. The callback path
/// comes from the provider's redirect URL so the state cookie scope and the
/// mounted route always agree.
fn provider_router(
    login_path: &str,
    provider: OAuth2Provider,
    app: Arc<AppState>,
) -> Router {
    let callback_path = provider.callback_path().to_string();
    let flow = ProviderFlow {
        app,
        provider: Arc::new(provider),
    };
    Router::new()
        .route(login_path, get(auth::login))
        .route(&callback_path, get(auth::callback))
        .with_state(flow)
}

/// Demo route showing the extractor in front of a handler.
async fn protected(RequireAuth(subject): RequireAuth) -> String {
    format!("hello, {subject}")
}
