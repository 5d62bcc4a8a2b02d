//! Authentication module for the gatehouse server.
//!
//! This module provides:
//! - Login and callback handlers for the OAuth2 round trip (`routes`)
//! - Refresh token rotation (`refresh`)
//! - An extractor gating protected routes (`middleware`)
//! - Cookie plumbing shared by the handlers (`cookies`)
//!
//! # Flow
//!
//! Login generates a single-use CSRF state, parks it in a cookie scoped to
//! the provider's callback path, and redirects to the provider. The callback
//! verifies the state, exchanges the code, fetches the profile, asks the
//! host's [`UserResolver`] for a local subject, and issues an access/refresh
//! pair. Clients rotate the pair at the refresh endpoint before the access
//! token expires; the store's per-subject record is what retires old refresh
//! tokens.
//!
//! # Known race
//!
//! Two concurrent refresh requests for the same subject can both pass the
//! stored-token comparison before either write lands. The store is
//! last-write-wins, so at most one of the resulting refresh tokens stays
//! valid and the losing client fails its next refresh. The core does not
//! serialize per-subject rotation.

pub mod cookies;
pub mod middleware;
pub mod refresh;
pub mod routes;

#[cfg(test)]
pub(crate) mod testing;

pub use middleware::RequireAuth;
pub use refresh::refresh;
pub use routes::{callback, login};

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use crate::config::TransportConfig;
use gatehouse_oauth::{Provider, ProviderProfile};
use gatehouse_token::{JwtManager, Subject, TokenStore};

/// Error type the host's resolver may return.
pub type ResolveError = Box<dyn std::error::Error + Send + Sync>;

/// Host-supplied callback that turns a provider profile into a local
/// subject, creating the account if needed.
#[async_trait::async_trait]
pub trait UserResolver: Send + Sync {
    /// Resolves or creates the local user for this profile.
    async fn resolve(&self, profile: ProviderProfile) -> Result<Subject, ResolveError>;
}

/// Shared application state.
pub struct AppState {
    /// Issues and validates session tokens.
    pub jwt: JwtManager,
    /// Current refresh token per subject.
    pub store: Arc<dyn TokenStore>,
    /// Host callback resolving provider profiles to local subjects.
    pub resolver: Arc<dyn UserResolver>,
    /// Cookie and header configuration.
    pub transport: TransportConfig,
    /// Upper bound on provider network calls per callback.
    pub handler_timeout: std::time::Duration,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        jwt: JwtManager,
        store: Arc<dyn TokenStore>,
        resolver: Arc<dyn UserResolver>,
        transport: TransportConfig,
        handler_timeout: std::time::Duration,
    ) -> Self {
        Self {
            jwt,
            store,
            resolver,
            transport,
            handler_timeout,
        }
    }

    /// Builds the 200 response delivering a fresh token pair, either as
    /// cookies (lifetimes matching the token TTLs) or as headers.
    pub(crate) fn token_response(
        &self,
        access: String,
        refresh: String,
        via_headers: bool,
    ) -> Response {
        if via_headers {
            let Some((access_name, access_value)) =
                header_pair(&self.transport.access_header, &access)
            else {
                tracing::error!("access token header could not be constructed");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            };
            let Some((refresh_name, refresh_value)) =
                header_pair(&self.transport.refresh_header, &refresh)
            else {
                tracing::error!("refresh token header could not be constructed");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            };

            let mut response = StatusCode::OK.into_response();
            response.headers_mut().insert(access_name, access_value);
            response.headers_mut().insert(refresh_name, refresh_value);
            response
        } else {
            let access_cookie = cookies::build(
                &self.transport.access_cookie,
                access,
                "/",
                cookies::cookie_age(self.jwt.access_ttl()),
                self.transport.secure_cookies,
            );
            let refresh_cookie = cookies::build(
                &self.transport.refresh_cookie,
                refresh,
                "/",
                cookies::cookie_age(self.jwt.refresh_ttl()),
                self.transport.secure_cookies,
            );

            (
                CookieJar::new().add(access_cookie).add(refresh_cookie),
                StatusCode::OK,
            )
                .into_response()
        }
    }
}

/// Per-provider router state: the shared state plus one provider.
#[derive(Clone)]
pub struct ProviderFlow {
    /// Shared application state.
    pub app: Arc<AppState>,
    /// The provider this route pair talks to.
    pub provider: Arc<dyn Provider>,
}

fn header_pair(name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
    let value = HeaderValue::from_str(value).ok()?;
    Some((name, value))
}
