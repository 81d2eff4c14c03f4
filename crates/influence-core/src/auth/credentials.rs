use std::sync::Arc;

use tracing::debug;

use super::storage::{SecureStorage, StorageResult};
use crate::models::TokenPair;

/// Storage key for the access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Token-level view over a [`SecureStorage`] backend.
///
/// Nothing is cached in memory: every read goes to the backend, so the
/// most recent successful write wins across concurrent requests.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn SecureStorage>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn SecureStorage>) -> Self {
        Self { storage }
    }

    pub fn backend_name(&self) -> &'static str {
        self.storage.name()
    }

    /// Read the current access token, if one is stored
    pub async fn access_token(&self) -> StorageResult<Option<String>> {
        self.storage.get(ACCESS_TOKEN_KEY).await
    }

    /// Read the current refresh token, if one is stored
    pub async fn refresh_token(&self) -> StorageResult<Option<String>> {
        self.storage.get(REFRESH_TOKEN_KEY).await
    }

    /// Persist both tokens of a freshly issued pair
    pub async fn save(&self, tokens: &TokenPair) -> StorageResult<()> {
        self.storage.set(ACCESS_TOKEN_KEY, &tokens.access_token).await?;
        self.storage.set(REFRESH_TOKEN_KEY, &tokens.refresh_token).await?;
        debug!(backend = self.storage.name(), "Stored credential pair");
        Ok(())
    }

    /// Delete both tokens. Both deletes are attempted even if the first fails.
    pub async fn clear(&self) -> StorageResult<()> {
        let access = self.storage.delete(ACCESS_TOKEN_KEY).await;
        let refresh = self.storage.delete(REFRESH_TOKEN_KEY).await;
        debug!(backend = self.storage.name(), "Cleared credential pair");
        access.and(refresh)
    }

    /// Check if an access token is stored
    pub async fn has_credentials(&self) -> bool {
        matches!(self.access_token().await, Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            token_type: "bearer".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_overwrites_both_tokens() {
        let store = CredentialStore::new(Arc::new(MemoryStorage::new()));
        assert!(!store.has_credentials().await);

        store.save(&pair("a1", "r1")).await.unwrap();
        store.save(&pair("a2", "r2")).await.unwrap();

        assert_eq!(store.access_token().await.unwrap().as_deref(), Some("a2"));
        assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("r2"));
        assert!(store.has_credentials().await);
    }

    #[tokio::test]
    async fn test_clear_removes_both_tokens() {
        let store = CredentialStore::new(Arc::new(MemoryStorage::new()));
        store.save(&pair("a", "r")).await.unwrap();

        store.clear().await.unwrap();

        assert_eq!(store.access_token().await.unwrap(), None);
        assert_eq!(store.refresh_token().await.unwrap(), None);
        // Clearing an empty store is fine
        store.clear().await.unwrap();
    }
}
