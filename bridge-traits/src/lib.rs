//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host
//! platform embedding the LeafGuard client core.
//!
//! ## Overview
//!
//! This crate defines the contract between the client core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that differs per platform (desktop, iOS, Android).
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - raw single-attempt HTTP transport
//! - [`NetworkMonitor`](network::NetworkMonitor) - connectivity detection and
//!   change subscription
//! - [`SecureStore`](storage::SecureStore) - credential persistence
//!   (Keychain/Keystore/DPAPI)
//!
//! Retry policy, bearer-token attachment and error classification are core
//! policy and intentionally live *above* these traits, in `core-api`.
//!
//! ## Error Handling
//!
//! All bridge traits report failures through
//! [`BridgeError`](error::BridgeError). Transport implementations must map
//! no-response conditions (connect failure, timeout) to the dedicated
//! variants so the core can tell them apart from received HTTP statuses.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`; implementations are shared
//! across async tasks behind `Arc`.

pub mod error;
pub mod http;
pub mod network;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use network::{NetworkChangeStream, NetworkInfo, NetworkMonitor, NetworkStatus};
pub use storage::SecureStore;
