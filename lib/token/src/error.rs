//! Error types for the token crate.
//!
//! - `TokenError`: issuance and validation failures
//! - `StoreError`: refresh-token record lookup/persistence failures

use std::fmt;

/// Errors from token issuance and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signature computation failed during issuance. Internal/fatal; never
    /// expected in normal operation.
    Signing { reason: String },
    /// The current time is outside the token's `[nbf, exp)` window.
    Expired,
    /// The signature does not verify, or the token was signed with an
    /// algorithm other than the configured one.
    Signature,
    /// Structurally invalid token.
    Malformed { reason: String },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signing { reason } => {
                write!(f, "failed to sign token: {reason}")
            }
            Self::Expired => {
                write!(f, "token is outside its validity window")
            }
            Self::Signature => {
                write!(f, "token signature is invalid")
            }
            Self::Malformed { reason } => {
                write!(f, "malformed token: {reason}")
            }
        }
    }
}

impl std::error::Error for TokenError {}

/// Errors from the refresh-token store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No refresh token is recorded for the subject.
    NotFound { subject: String },
    /// The backing store could not be reached.
    Unavailable { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { subject } => {
                write!(f, "no refresh token recorded for subject: {subject}")
            }
            Self::Unavailable { reason } => {
                write!(f, "token store unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for StoreError {}
