//! Login and callback handlers for the OAuth2 round trip.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use base64::Engine;
use rand::RngCore;
use serde::Deserialize;
use time::Duration as TimeDuration;

use super::{ProviderFlow, cookies};
use gatehouse_oauth::ProviderProfile;
use gatehouse_token::TokenKind;

/// Bytes of entropy in the CSRF state value.
const STATE_BYTES: usize = 32;

/// Query parameters for the provider callback.
///
/// Both fields are required: a callback missing either one is rejected by
/// the extractor as a malformed request (400) before state verification
/// runs, rather than carried forward to fail at the exchange.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: String,
}

/// Initiates the login flow: generates the CSRF state, parks it in a cookie
/// scoped to the callback path, and redirects to the provider.
pub async fn login(
    State(flow): State<ProviderFlow>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthFlowError> {
    let state = generate_state()?;

    let state_cookie = cookies::build(
        &flow.app.transport.state_cookie,
        state.clone(),
        flow.provider.callback_path(),
        TimeDuration::minutes(flow.app.transport.state_ttl_minutes),
        flow.app.transport.secure_cookies,
    );

    let auth_url = flow.provider.auth_code_url(&state);
    Ok((jar.add(state_cookie), Redirect::temporary(&auth_url)))
}

/// Completes the login flow after the provider redirects back.
///
/// Each stage is a hard precondition for the next; no stage is retried. No
/// token is issued unless state verification, code exchange, profile fetch,
/// and user resolution have all succeeded.
pub async fn callback(
    State(flow): State<ProviderFlow>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Response {
    // The state cookie must be present.
    let Some(state_cookie) = jar.get(&flow.app.transport.state_cookie) else {
        return AuthFlowError::MissingState.into_response();
    };
    let stored_state = state_cookie.value().to_string();

    // Exact match against the state echoed by the provider.
    if query.state != stored_state {
        return AuthFlowError::StateMismatch.into_response();
    }

    // The state is single-use: remove the cookie before any provider call so
    // it cannot be replayed across failed attempts. Every exit below, success
    // or failure, carries this removal.
    let jar = jar.add(cookies::removal(
        &flow.app.transport.state_cookie,
        flow.provider.callback_path(),
    ));

    match complete_login(&flow, &query.code).await {
        Ok(issued) => {
            let response = flow.app.token_response(
                issued.access,
                issued.refresh,
                flow.app.transport.header_tokens,
            );
            (jar, response).into_response()
        }
        Err(err) => (jar, err).into_response(),
    }
}

struct IssuedTokens {
    access: String,
    refresh: String,
}

async fn complete_login(flow: &ProviderFlow, code: &str) -> Result<IssuedTokens, AuthFlowError> {
    let app = &flow.app;
    let provider = &flow.provider;

    // Code exchange and profile fetch are network calls to the provider,
    // bounded together by the configured handler timeout.
    let raw = tokio::time::timeout(app.handler_timeout, async {
        let provider_token = provider
            .exchange_code(code)
            .await
            .map_err(|e| AuthFlowError::Exchange(e.to_string()))?;
        provider
            .fetch_profile(&provider_token)
            .await
            .map_err(|e| AuthFlowError::ProfileFetch(e.to_string()))
    })
    .await
    .map_err(|_| AuthFlowError::Timeout)??;

    // Decode into the required fields and stamp the provider name.
    let profile = ProviderProfile::from_raw(provider.name(), &raw)
        .map_err(|e| AuthFlowError::ProfileDecode(e.to_string()))?;

    // Hand the profile to the host to resolve a local subject.
    let subject = app
        .resolver
        .resolve(profile)
        .await
        .map_err(|e| AuthFlowError::UserResolution(e.to_string()))?;

    // Issue the session pair.
    let access = app
        .jwt
        .issue(TokenKind::Access, &subject)
        .map_err(|e| AuthFlowError::TokenIssue(e.to_string()))?;
    let refresh = app
        .jwt
        .issue(TokenKind::Refresh, &subject)
        .map_err(|e| AuthFlowError::TokenIssue(e.to_string()))?;

    // Record the refresh token so rotation can detect reuse.
    app.store
        .store(&subject, &refresh)
        .await
        .map_err(|e| AuthFlowError::Store(e.to_string()))?;

    tracing::info!(subject = %subject, provider = provider.name(), "login completed");

    Ok(IssuedTokens { access, refresh })
}

fn generate_state() -> Result<String, AuthFlowError> {
    let mut buf = [0u8; STATE_BYTES];
    rand::rngs::OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| AuthFlowError::StateGeneration(e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

/// Login/callback flow errors.
#[derive(Debug)]
pub enum AuthFlowError {
    /// The system randomness source failed. Never substituted with a
    /// weaker state.
    StateGeneration(String),
    /// No state cookie accompanied the callback.
    MissingState,
    /// The state echoed by the provider does not match the cookie.
    StateMismatch,
    /// Provider calls exceeded the handler timeout.
    Timeout,
    /// The code-for-token exchange failed.
    Exchange(String),
    /// The profile fetch failed.
    ProfileFetch(String),
    /// The profile response was missing required fields.
    ProfileDecode(String),
    /// The host's user-resolution callback failed.
    UserResolution(String),
    /// Token signing failed.
    TokenIssue(String),
    /// The refresh token could not be recorded.
    Store(String),
}

impl IntoResponse for AuthFlowError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::StateGeneration(msg) => {
                tracing::error!("state generation failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error generating state")
            }
            Self::MissingState => (StatusCode::BAD_REQUEST, "State cookie not found"),
            Self::StateMismatch => {
                tracing::warn!("callback state does not match state cookie");
                (StatusCode::UNAUTHORIZED, "State mismatch")
            }
            Self::Timeout => {
                tracing::warn!("provider calls timed out");
                (StatusCode::UNAUTHORIZED, "Authentication failed")
            }
            Self::Exchange(msg) => {
                tracing::warn!("code exchange failed: {}", msg);
                (StatusCode::UNAUTHORIZED, "Code not valid")
            }
            Self::ProfileFetch(msg) => {
                tracing::warn!("profile fetch failed: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    "Failed to get user info from provider",
                )
            }
            Self::ProfileDecode(msg) => {
                tracing::error!("profile decode failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to decode provider user",
                )
            }
            Self::UserResolution(msg) => {
                tracing::error!("user resolution failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to resolve user")
            }
            Self::TokenIssue(msg) => {
                tracing::error!("token issuance failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create session tokens",
                )
            }
            Self::Store(msg) => {
                tracing::error!("refresh token store failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store refresh token",
                )
            }
        };

        (status, message).into_response()
    }
}
