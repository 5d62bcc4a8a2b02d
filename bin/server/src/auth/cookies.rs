//! Cookie construction shared by the auth handlers.
//!
//! All auth cookies are HTTP-only and SameSite=Lax; the Secure flag comes
//! from configuration so local HTTP development stays possible.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Builds a cookie with the standard auth security flags.
pub fn build(
    name: &str,
    value: String,
    path: &str,
    max_age: Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), value))
        .path(path.to_string())
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Builds a removal cookie. The path must match the one the cookie was set
/// with or the user agent will keep the original.
pub fn removal(name: &str, path: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path(path.to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// Converts a token lifetime into a cookie max-age so both expire together.
pub fn cookie_age(ttl: chrono::Duration) -> Duration {
    Duration::seconds(ttl.num_seconds())
}
