//! # Core Configuration Module
//!
//! Builder-based configuration for the LeafGuard client core. The builder
//! collects the host-provided bridge implementations and API settings, and
//! validates fail-fast so a missing capability is reported at startup with
//! an actionable message rather than surfacing as a runtime panic later.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - raw transport for all API calls
//! - `SecureStore` - credential persistence
//! - `NetworkMonitor` - connectivity detection for the offline fallback
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use bridge_desktop::{DesktopNetworkMonitor, KeyringSecureStore, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .http_client(Arc::new(ReqwestHttpClient::new()))
//!     .secure_store(Arc::new(KeyringSecureStore::new()))
//!     .network_monitor(Arc::new(DesktopNetworkMonitor::new()))
//!     .api_base_url("https://api.leafguard.example/api")
//!     .build()
//!     .expect("Failed to build config");
//! ```

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{HttpClient, NetworkMonitor, SecureStore};

use crate::error::{Error, Result};

/// Default request timeout for API calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Core configuration for the LeafGuard client core.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Raw HTTP transport (required)
    pub http_client: Arc<dyn HttpClient>,

    /// Secure credential storage (required)
    pub secure_store: Arc<dyn SecureStore>,

    /// Network connectivity monitor (required)
    pub network_monitor: Arc<dyn NetworkMonitor>,

    /// Base URL of the LeafGuard backend; `None` uses the compiled-in
    /// default
    pub api_base_url: Option<String>,

    /// Per-request timeout for API calls
    pub request_timeout: Duration,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("http_client", &"HttpClient { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .field("network_monitor", &"NetworkMonitor { ... }")
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl CoreConfig {
    /// Start building a configuration.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    network_monitor: Option<Arc<dyn NetworkMonitor>>,
    api_base_url: Option<String>,
    request_timeout: Option<Duration>,
}

impl CoreConfigBuilder {
    /// Set the HTTP transport implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the secure credential store implementation.
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Set the network monitor implementation.
    pub fn network_monitor(mut self, monitor: Arc<dyn NetworkMonitor>) -> Self {
        self.network_monitor = Some(monitor);
        self
    }

    /// Point the client at a specific backend deployment.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Override the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] naming the first missing bridge.
    pub fn build(self) -> Result<CoreConfig> {
        let http_client = self.http_client.ok_or_else(|| Error::CapabilityMissing {
            capability: "HttpClient".to_string(),
            message: "No HTTP transport provided. Desktop hosts: pass \
                      bridge_desktop::ReqwestHttpClient. Mobile hosts: inject the \
                      platform-native adapter."
                .to_string(),
        })?;

        let secure_store = self.secure_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "SecureStore".to_string(),
            message: "No secure store provided. Desktop hosts: pass \
                      bridge_desktop::KeyringSecureStore. Mobile hosts: inject \
                      Keychain/Keystore adapters."
                .to_string(),
        })?;

        let network_monitor = self
            .network_monitor
            .ok_or_else(|| Error::CapabilityMissing {
                capability: "NetworkMonitor".to_string(),
                message: "No network monitor provided. Desktop hosts: pass \
                          bridge_desktop::DesktopNetworkMonitor. Mobile hosts: inject \
                          Reachability/ConnectivityManager adapters."
                    .to_string(),
            })?;

        Ok(CoreConfig {
            http_client,
            secure_store,
            network_monitor,
            api_base_url: self.api_base_url,
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        })
    }
}
