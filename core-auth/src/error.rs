use thiserror::Error;

use core_api::ApiError;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The device has no connectivity and the credentials match neither the
    /// built-in account nor the stored offline pair.
    #[error("No internet connection. Use the default account or try again later")]
    NoConnectivity,

    /// The monitor reported connectivity but the server never answered
    /// (DNS failure, server down).
    #[error("Could not reach the server. Please try again later")]
    ServerConnectionFailed,

    #[error("A sign-in is already in progress")]
    SignInInProgress,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Secure storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A persisted value failed to deserialize; it has been deleted.
    #[error("Stored {what} is corrupted: {reason}")]
    CredentialsCorrupted { what: &'static str, reason: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Whether trying again could reasonably succeed (connectivity and
    /// server availability change; rejected credentials do not).
    pub fn is_recoverable(&self) -> bool {
        match self {
            AuthError::NoConnectivity
            | AuthError::ServerConnectionFailed
            | AuthError::SignInInProgress => true,
            AuthError::Api(e) => e.is_retryable(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        assert!(AuthError::NoConnectivity.is_recoverable());
        assert!(AuthError::ServerConnectionFailed.is_recoverable());
        assert!(AuthError::Api(ApiError::Server { status: 500 }).is_recoverable());
        assert!(!AuthError::Api(ApiError::InvalidCredentials).is_recoverable());
        assert!(!AuthError::NotAuthenticated.is_recoverable());
    }
}
