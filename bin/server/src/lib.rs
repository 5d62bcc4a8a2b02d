//! Authentication front-door server for gatehouse.
//!
//! Wires the token and oauth crates into axum handlers: third-party login
//! and callback per provider, first-party token refresh, and an extractor
//! gating protected routes.

pub mod auth;
pub mod config;
