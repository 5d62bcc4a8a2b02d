//! Refresh token rotation.
//!
//! A refresh request must present the exact refresh token currently recorded
//! for its subject. Signature validity alone is not enough: a token that was
//! rotated away still verifies until its expiry instant, and the string
//! comparison against the store is what rejects it.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use super::AppState;
use gatehouse_token::{StoreError, TokenKind};

/// Rotates a valid refresh token into a new access/refresh pair.
///
/// The response uses the transport the request arrived on: header in,
/// headers out; cookie in, cookies out.
pub async fn refresh(
    State(app): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Response, RefreshError> {
    let (presented, via_header) = match jar.get(&app.transport.refresh_cookie) {
        Some(cookie) => (cookie.value().to_string(), false),
        None => {
            let header = headers
                .get(app.transport.refresh_header.as_str())
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .ok_or(RefreshError::NotProvided)?;
            (header.to_string(), true)
        }
    };

    // Signature and expiry first; the claims give us the subject.
    let claims = app.jwt.validate(&presented).map_err(|e| {
        tracing::warn!("invalid refresh token: {}", e);
        RefreshError::Invalid
    })?;
    let subject = claims.sub;

    // The stored record is the authority on which refresh token is current.
    let stored = match app.store.current(&subject).await {
        Ok(stored) => stored,
        Err(StoreError::NotFound { .. }) => {
            tracing::warn!(subject = %subject, "refresh token valid but no record stored");
            return Err(RefreshError::Invalid);
        }
        Err(StoreError::Unavailable { reason }) => {
            return Err(RefreshError::StoreUnavailable(reason));
        }
    };

    // Exact string equality. A previously rotated-away token no longer
    // matches even while its signature still verifies.
    if stored != presented {
        tracing::warn!(subject = %subject, "presented refresh token does not match stored token");
        return Err(RefreshError::Invalid);
    }

    let access = app
        .jwt
        .issue(TokenKind::Access, &subject)
        .map_err(|e| RefreshError::Issue(e.to_string()))?;
    let new_refresh = app
        .jwt
        .issue(TokenKind::Refresh, &subject)
        .map_err(|e| RefreshError::Issue(e.to_string()))?;

    // Rotation: overwriting the record retires the token just presented.
    app.store
        .store(&subject, &new_refresh)
        .await
        .map_err(|e| RefreshError::Store(e.to_string()))?;

    tracing::info!(subject = %subject, "refresh tokens rotated");

    Ok(app.token_response(access, new_refresh, via_header))
}

/// Refresh flow errors.
#[derive(Debug)]
pub enum RefreshError {
    /// Neither the refresh cookie nor the refresh header was present.
    NotProvided,
    /// Signature/expiry failure, missing record, or stored-token mismatch.
    /// Deliberately indistinguishable to the caller.
    Invalid,
    /// The token store could not be reached.
    StoreUnavailable(String),
    /// Token signing failed.
    Issue(String),
    /// The rotated refresh token could not be recorded.
    Store(String),
}

impl IntoResponse for RefreshError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotProvided => (StatusCode::UNAUTHORIZED, "Refresh token not provided"),
            Self::Invalid => (StatusCode::UNAUTHORIZED, "Invalid refresh token"),
            Self::StoreUnavailable(msg) => {
                tracing::error!("token store unavailable: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            Self::Issue(msg) => {
                tracing::error!("token issuance failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            Self::Store(msg) => {
                tracing::error!("refresh token store failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}
