//! Session token issuance, validation, and refresh-token storage for gatehouse.
//!
//! This crate provides:
//! - Signed session claims (`Claims`, `Subject`)
//! - JWT issuance and validation (`JwtManager`, `TokenKind`)
//! - Server-side refresh token records (`TokenStore`, `InMemoryTokenStore`)
//!
//! # Token Model
//!
//! Access and refresh tokens share one claims shape and differ only in their
//! expiry duration. Which token is *the* refresh token for a subject is not
//! encoded in the claims; it is enforced by the [`TokenStore`], which keeps
//! exactly one currently-valid refresh token per subject. Overwriting that
//! record on every login and refresh is what invalidates previously issued
//! refresh tokens, even while their signatures still verify.

pub mod claims;
pub mod error;
pub mod jwt;
pub mod store;

// Re-export main types at crate root
pub use claims::{Claims, Subject, TokenKind};
pub use error::{StoreError, TokenError};
pub use jwt::JwtManager;
pub use store::{InMemoryTokenStore, TokenStore};
