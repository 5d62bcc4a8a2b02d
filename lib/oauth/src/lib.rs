//! OAuth2 authorization-code provider abstraction for gatehouse.
//!
//! This crate provides:
//! - The [`Provider`] capability consumed by the login and callback handlers
//! - [`OAuth2Provider`], one implementation covering any provider that
//!   speaks the standard authorization-code grant
//! - Preconfigured constructors for Google and Spotify
//! - [`ProviderProfile`], the decoded identity handed to the host
//!
//! Providers are stateless beyond their static configuration; every flow
//! state (CSRF state, issued tokens) lives with the caller.

pub mod error;
pub mod profile;
pub mod provider;

// Re-export main types at crate root
pub use error::ProviderError;
pub use profile::ProviderProfile;
pub use provider::{OAuth2Provider, Provider, ProviderToken};
