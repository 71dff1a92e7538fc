//! Secure Credential Storage Abstraction
//!
//! The client persists exactly three values between launches: the bearer
//! token, the serialized user profile, and the offline credential pair. All
//! three are secrets or contain secrets, so the only persistence surface is
//! the platform secure store.

use async_trait::async_trait;

use crate::error::Result;

/// Secure credential storage trait
///
/// Abstracts platform secure storage mechanisms:
/// - macOS/iOS: Keychain
/// - Android: Keystore (hardware-backed when available)
/// - Windows: Credential Manager (DPAPI)
/// - Linux: Secret Service / libsecret
///
/// # Security Requirements
///
/// Implementations MUST:
/// - Encrypt data at rest
/// - Never log or expose stored values
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SecureStore;
///
/// async fn remember_token(store: &dyn SecureStore, token: &str) -> Result<()> {
///     store.set_secret("auth_token", token.as_bytes()).await
/// }
/// ```
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Store a secret value, overwriting any previous value for `key`.
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Retrieve a secret value.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a secret. Idempotent: deleting a missing key succeeds.
    async fn delete_secret(&self, key: &str) -> Result<()>;

    /// Check if a secret exists without retrieving it
    async fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.get_secret(key).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore {
        entries: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl SecureStore for MapStore {
        async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn delete_secret(&self, key: &str) -> Result<()> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_default_has_secret() {
        let store = MapStore::default();
        assert!(!store.has_secret("auth_token").await.unwrap());

        store.set_secret("auth_token", b"tok").await.unwrap();
        assert!(store.has_secret("auth_token").await.unwrap());

        store.delete_secret("auth_token").await.unwrap();
        assert!(!store.has_secret("auth_token").await.unwrap());
    }
}
