//! Server-side record of the current refresh token per subject.
//!
//! The store is the replay defense for refresh rotation: a refresh token is
//! only accepted while it equals the stored value for its subject. Issuing a
//! new refresh token overwrites the record, which retires every previously
//! issued one regardless of remaining signature lifetime.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::claims::Subject;
use crate::error::StoreError;

/// Keeps the single currently-valid refresh token for each subject.
///
/// Implementations must be safe for concurrent use across subjects. Writes
/// to the same subject race last-write-wins; the core never serializes them.
/// There is no delete operation: revocation, if the host wants it, is an
/// overwrite with a token the client never receives.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Records `token` as the current refresh token for `subject`,
    /// overwriting any prior value. Idempotent under retry.
    async fn store(&self, subject: &Subject, token: &str) -> Result<(), StoreError>;

    /// Returns the current refresh token for `subject`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] when no token is recorded
    /// - [`StoreError::Unavailable`] when the backend cannot be reached
    async fn current(&self, subject: &Subject) -> Result<String, StoreError>;
}

/// In-memory token store backed by a read-write-locked map.
///
/// Suitable for single-process deployments and tests. Hosts that need
/// persistence or multi-process sharing supply their own [`TokenStore`].
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn store(&self, subject: &Subject, token: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(subject.as_str().to_string(), token.to_string());
        Ok(())
    }

    async fn current(&self, subject: &Subject) -> Result<String, StoreError> {
        let entries = self.entries.read().await;
        entries
            .get(subject.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                subject: subject.as_str().to_string(),
            })
    }
}
