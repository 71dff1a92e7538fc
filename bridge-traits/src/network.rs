//! Network Monitoring Abstraction
//!
//! Provides connectivity state to the auth orchestrator so it can choose
//! between the online login path and the offline fallback before any HTTP
//! call is dispatched.

use async_trait::async_trait;

use crate::error::Result;

/// Network connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    /// Connected to a network
    Connected,
    /// Not connected to any network
    Disconnected,
    /// Connection status unknown or indeterminate
    Indeterminate,
}

/// Network information
#[derive(Debug, Clone)]
pub struct NetworkInfo {
    pub status: NetworkStatus,
    /// Whether the connection is metered (has data limits/costs)
    pub is_metered: bool,
}

/// Network monitor trait
///
/// Connectivity is advisory: a `Connected` report does not guarantee the
/// backend is reachable (DNS or the server itself may still be down), which
/// is why the orchestrator distinguishes "no connectivity" from "server
/// unreachable".
///
/// # Platform Support
///
/// - **Desktop**: socket probe or system network APIs
/// - **iOS**: Network framework, Reachability
/// - **Android**: ConnectivityManager
#[async_trait]
pub trait NetworkMonitor: Send + Sync {
    /// Get current network information
    async fn network_info(&self) -> Result<NetworkInfo>;

    /// Check if currently connected to any network
    async fn is_connected(&self) -> bool {
        matches!(
            self.network_info().await,
            Ok(NetworkInfo {
                status: NetworkStatus::Connected,
                ..
            })
        )
    }

    /// Subscribe to network status changes
    ///
    /// Returns a stream of network info updates. Implementations emit an
    /// item whenever the connectivity status changes.
    async fn subscribe_changes(&self) -> Result<Box<dyn NetworkChangeStream>>;
}

/// Stream of network status changes
#[async_trait]
pub trait NetworkChangeStream: Send {
    /// Get the next network info update
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<NetworkInfo>;
}
