//! Credential Cache
//!
//! Typed persistence for the three values the client keeps between
//! launches: the bearer token, the last-known user profile (token
//! excluded), and the offline credential pair.
//!
//! ## Write discipline
//!
//! The auth orchestrator is the only writer of the full triplet. The API
//! client reads the token through [`TokenProvider`] and clears it on a 401;
//! it never writes anything else.
//!
//! ## Security
//!
//! - Values live in the platform secure store (`SecureStore` trait)
//! - Stored values are never logged
//! - A value that fails to deserialize is deleted and reported, so one
//!   corrupted entry cannot wedge every subsequent launch
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::CredentialCache;
//! use std::sync::Arc;
//! # use bridge_traits::storage::SecureStore;
//! # async fn example(secure_store: Arc<dyn SecureStore>) -> core_auth::Result<()> {
//! let cache = CredentialCache::new(secure_store);
//!
//! let token = cache.token().await?;
//! if token.is_none() {
//!     // unauthenticated start
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use bridge_traits::storage::SecureStore;
use core_api::{TokenProvider, UserProfile};

use crate::error::{AuthError, Result};
use crate::types::OfflineCredentials;

const TOKEN_KEY: &str = "auth_token";
const PROFILE_KEY: &str = "user_profile";
const OFFLINE_CREDENTIALS_KEY: &str = "offline_credentials";

/// Persistent cache for token, profile and offline credential pair.
#[derive(Clone)]
pub struct CredentialCache {
    store: Arc<dyn SecureStore>,
}

impl CredentialCache {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        debug!("Initializing credential cache");
        Self { store }
    }

    /// Persist a freshly issued token together with its profile.
    ///
    /// The two are written as one coarse update; there is no state where
    /// only half of an online session is persisted on this path.
    pub async fn store_session(&self, token: &str, profile: &UserProfile) -> Result<()> {
        self.store
            .set_secret(TOKEN_KEY, token.as_bytes())
            .await
            .map_err(|e| AuthError::StorageUnavailable(e.to_string()))?;
        self.store_profile(profile).await?;

        info!(user_id = %profile.id, "Session persisted");
        Ok(())
    }

    /// The cached bearer token, if any.
    pub async fn token(&self) -> Result<Option<String>> {
        let bytes = self
            .store
            .get_secret(TOKEN_KEY)
            .await
            .map_err(|e| AuthError::StorageUnavailable(e.to_string()))?;

        match bytes {
            Some(bytes) => match String::from_utf8(bytes) {
                Ok(token) => Ok(Some(token)),
                Err(e) => {
                    self.delete(TOKEN_KEY).await;
                    Err(AuthError::CredentialsCorrupted {
                        what: "token",
                        reason: e.to_string(),
                    })
                }
            },
            None => Ok(None),
        }
    }

    /// Remove only the token. Used when the server answers 401.
    pub async fn clear_token(&self) -> Result<()> {
        self.store
            .delete_secret(TOKEN_KEY)
            .await
            .map_err(|e| AuthError::StorageUnavailable(e.to_string()))?;
        info!("Cached token cleared");
        Ok(())
    }

    /// Persist the profile portion only (scan-count and subscription
    /// updates).
    pub async fn store_profile(&self, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_vec(profile).map_err(|e| AuthError::CredentialsCorrupted {
            what: "profile",
            reason: e.to_string(),
        })?;
        self.store
            .set_secret(PROFILE_KEY, &json)
            .await
            .map_err(|e| AuthError::StorageUnavailable(e.to_string()))
    }

    /// The last-known user profile, if any.
    pub async fn stored_profile(&self) -> Result<Option<UserProfile>> {
        let bytes = self
            .store
            .get_secret(PROFILE_KEY)
            .await
            .map_err(|e| AuthError::StorageUnavailable(e.to_string()))?;

        let Some(bytes) = bytes else {
            return Ok(None);
        };

        match serde_json::from_slice(&bytes) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!(error = %e, "Stored profile corrupted, deleting");
                self.delete(PROFILE_KEY).await;
                Err(AuthError::CredentialsCorrupted {
                    what: "profile",
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Remember the pair that just logged in online.
    pub async fn store_offline_credentials(&self, credentials: &OfflineCredentials) -> Result<()> {
        let json =
            serde_json::to_vec(credentials).map_err(|e| AuthError::CredentialsCorrupted {
                what: "offline credentials",
                reason: e.to_string(),
            })?;
        self.store
            .set_secret(OFFLINE_CREDENTIALS_KEY, &json)
            .await
            .map_err(|e| AuthError::StorageUnavailable(e.to_string()))?;

        info!("Offline credentials remembered");
        Ok(())
    }

    /// The remembered offline pair, if any.
    pub async fn offline_credentials(&self) -> Result<Option<OfflineCredentials>> {
        let bytes = self
            .store
            .get_secret(OFFLINE_CREDENTIALS_KEY)
            .await
            .map_err(|e| AuthError::StorageUnavailable(e.to_string()))?;

        let Some(bytes) = bytes else {
            return Ok(None);
        };

        match serde_json::from_slice(&bytes) {
            Ok(credentials) => Ok(Some(credentials)),
            Err(e) => {
                warn!(error = %e, "Stored offline credentials corrupted, deleting");
                self.delete(OFFLINE_CREDENTIALS_KEY).await;
                Err(AuthError::CredentialsCorrupted {
                    what: "offline credentials",
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Logout: clear token and profile together. The offline pair survives
    /// so a later offline login still works.
    pub async fn clear_session(&self) -> Result<()> {
        self.store
            .delete_secret(TOKEN_KEY)
            .await
            .map_err(|e| AuthError::StorageUnavailable(e.to_string()))?;
        self.store
            .delete_secret(PROFILE_KEY)
            .await
            .map_err(|e| AuthError::StorageUnavailable(e.to_string()))?;

        info!("Session cleared, offline credentials retained");
        Ok(())
    }

    async fn delete(&self, key: &str) {
        if let Err(e) = self.store.delete_secret(key).await {
            warn!(key = key, error = %e, "Failed to delete corrupted entry");
        }
    }
}

#[async_trait]
impl TokenProvider for CredentialCache {
    async fn token(&self) -> Option<String> {
        match CredentialCache::token(self).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Token read failed, dispatching without bearer");
                None
            }
        }
    }

    async fn invalidate(&self) {
        if let Err(e) = self.clear_token().await {
            warn!(error = %e, "Failed to clear token after 401");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MemorySecureStore {
        entries: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl SecureStore for MemorySecureStore {
        async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
            self.entries
                .lock()
                .await
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
            Ok(self.entries.lock().await.get(key).cloned())
        }

        async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
            self.entries.lock().await.remove(key);
            Ok(())
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: "663d2e".to_string(),
            name: "Ada".to_string(),
            email: "ada@leafguard.com".to_string(),
            role: "Farmer".to_string(),
            is_subscribed: false,
            remaining_free_scans: 3,
        }
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let cache = CredentialCache::new(Arc::new(MemorySecureStore::default()));

        cache.store_session("jwt-token", &profile()).await.unwrap();

        assert_eq!(cache.token().await.unwrap().as_deref(), Some("jwt-token"));
        let stored = cache.stored_profile().await.unwrap().unwrap();
        assert_eq!(stored, profile());
    }

    #[tokio::test]
    async fn test_empty_cache_reads_none() {
        let cache = CredentialCache::new(Arc::new(MemorySecureStore::default()));

        assert!(cache.token().await.unwrap().is_none());
        assert!(cache.stored_profile().await.unwrap().is_none());
        assert!(cache.offline_credentials().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_session_keeps_offline_credentials() {
        let cache = CredentialCache::new(Arc::new(MemorySecureStore::default()));

        cache.store_session("jwt-token", &profile()).await.unwrap();
        cache
            .store_offline_credentials(&OfflineCredentials::new("ada@leafguard.com", "pw"))
            .await
            .unwrap();

        cache.clear_session().await.unwrap();

        assert!(cache.token().await.unwrap().is_none());
        assert!(cache.stored_profile().await.unwrap().is_none());
        let creds = cache.offline_credentials().await.unwrap().unwrap();
        assert!(creds.matches("ada@leafguard.com", "pw"));
    }

    #[tokio::test]
    async fn test_clear_token_leaves_profile() {
        let cache = CredentialCache::new(Arc::new(MemorySecureStore::default()));

        cache.store_session("jwt-token", &profile()).await.unwrap();
        cache.clear_token().await.unwrap();

        assert!(cache.token().await.unwrap().is_none());
        assert!(cache.stored_profile().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupted_profile_is_deleted_and_reported() {
        let store = Arc::new(MemorySecureStore::default());
        store.set_secret(PROFILE_KEY, b"{not json").await.unwrap();

        let cache = CredentialCache::new(store.clone());

        let err = cache.stored_profile().await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::CredentialsCorrupted { what: "profile", .. }
        ));

        // Entry was removed; next read is a clean miss
        assert!(cache.stored_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_token_provider_invalidate_clears_token() {
        let cache = CredentialCache::new(Arc::new(MemorySecureStore::default()));
        cache.store_session("jwt-token", &profile()).await.unwrap();

        let provider: &dyn TokenProvider = &cache;
        assert_eq!(provider.token().await.as_deref(), Some("jwt-token"));

        provider.invalidate().await;
        assert_eq!(provider.token().await, None);
    }

    #[tokio::test]
    async fn test_profile_overwrite() {
        let cache = CredentialCache::new(Arc::new(MemorySecureStore::default()));
        cache.store_session("jwt-token", &profile()).await.unwrap();

        let mut updated = profile();
        updated.remaining_free_scans = 1;
        cache.store_profile(&updated).await.unwrap();

        let stored = cache.stored_profile().await.unwrap().unwrap();
        assert_eq!(stored.remaining_free_scans, 1);
    }
}
