//! Authentication extractor for protected routes.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use super::AppState;
use gatehouse_token::Subject;

/// Extractor for requiring an authenticated subject.
///
/// Reads the access token from the configured cookie, falling back to a
/// `Bearer` token in the configured header. Any missing or invalid token is
/// a plain 401; the specific validation failure is not distinguished here.
pub struct RequireAuth(pub Subject);

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthRejection::InternalError)?;

        let token = match jar.get(&app.transport.access_cookie) {
            Some(cookie) => cookie.value().to_string(),
            None => bearer_token(parts, &app.transport.access_header)
                .ok_or(AuthRejection::NotAuthenticated)?,
        };

        let claims = app.jwt.validate(&token).map_err(|e| {
            tracing::debug!("access token rejected: {}", e);
            AuthRejection::NotAuthenticated
        })?;

        Ok(RequireAuth(claims.sub))
    }
}

/// Pulls a `Bearer` token out of the configured header, if present and
/// well-formed.
fn bearer_token(parts: &Parts, header_name: &str) -> Option<String> {
    parts
        .headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Rejection type for the authentication extractor.
#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated,
    InternalError,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated => {
                (StatusCode::UNAUTHORIZED, "Invalid or missing access token").into_response()
            }
            Self::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
