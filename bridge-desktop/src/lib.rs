//! # Desktop Bridge Implementations
//!
//! Default implementations of the bridge traits for desktop platforms
//! (macOS, Windows, Linux):
//! - `HttpClient` using `reqwest` (single-attempt transport)
//! - `SecureStore` using the `keyring` crate
//! - `NetworkMonitor` using a TCP connectivity probe
//!
//! ## Feature Flags
//!
//! - `secure-store`: OS keychain integration (default)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopNetworkMonitor, KeyringSecureStore, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new());
//! let secure_store = Arc::new(KeyringSecureStore::new());
//! let network_monitor = Arc::new(DesktopNetworkMonitor::new());
//! // Hand these to core_runtime::CoreConfig
//! ```

mod http;
mod network;

#[cfg(feature = "secure-store")]
mod secure_store;

pub use http::ReqwestHttpClient;
pub use network::DesktopNetworkMonitor;

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;
