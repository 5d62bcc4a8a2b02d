//! Session claims carried by signed tokens.

use serde::{Deserialize, Serialize};

/// Opaque local user identifier, assigned by the host application.
///
/// The subject is whatever string the host's user-resolution callback
/// returns; gatehouse never inspects its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    /// Creates a new subject from a string.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Returns the subject as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the subject is the empty string.
    ///
    /// An empty subject is never valid; validation rejects tokens carrying one.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Subject {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Subject {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which of the two session tokens to issue.
///
/// Both kinds share the same claims shape; the kind only selects the
/// expiry duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived token presented on every protected request.
    Access,
    /// Long-lived token presented only to the refresh endpoint.
    Refresh,
}

/// Signed payload of a session token.
///
/// Invariant: `exp > iat`. A token is valid only while the current time is
/// within `[nbf, exp)` and its HS256 signature verifies against the single
/// configured secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Local user id the token was issued for.
    pub sub: Subject,
    /// Static issuer string.
    pub iss: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Not-before, seconds since the Unix epoch.
    pub nbf: i64,
    /// Expires-at, seconds since the Unix epoch.
    pub exp: i64,
}
