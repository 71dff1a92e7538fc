//! API error taxonomy and response classification.
//!
//! Every failed call resolves to exactly one [`ApiError`] variant. The
//! generic classification (status class to variant) happens once in
//! [`classify_response`]; endpoint-specific refinements (a login 401 is bad
//! credentials, a detect 403 is an exhausted scan quota) are applied by the
//! typed operations in `client.rs`.

use thiserror::Error;

use bridge_traits::http::HttpResponse;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No connectivity, or no response after retries were exhausted.
    #[error("Network unreachable")]
    NetworkUnreachable,

    /// The server rejected the bearer token (401). The cached token has
    /// already been invalidated when this surfaces.
    #[error("Session expired")]
    SessionExpired,

    /// Resource not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Login was rejected (401 on the login endpoint).
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Login target account does not exist (404 on the login endpoint).
    #[error("Account not found")]
    AccountNotFound,

    /// Registration email is already taken.
    #[error("Email already exists")]
    EmailAlreadyExists,

    /// Registration payload was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Free scan quota exhausted (403 on the predict endpoint).
    #[error("No remaining free scans")]
    InsufficientScans,

    /// Any other 4xx response.
    #[error("Request rejected ({status}): {message}")]
    Validation { status: u16, message: String },

    /// 5xx response after retries were exhausted.
    #[error("Server error ({status})")]
    Server { status: u16 },

    /// Anything that defies classification, including undecodable bodies.
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl ApiError {
    /// Whether another attempt could change the outcome.
    ///
    /// Only no-response failures and server errors are retryable; a 4xx
    /// answer is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::NetworkUnreachable | ApiError::Server { .. })
    }
}

/// Error payload shape used by the backend for non-2xx responses.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Extract the server's error message, falling back to the raw body.
pub(crate) fn error_message(response: &HttpResponse) -> String {
    if let Ok(body) = response.json::<ErrorBody>() {
        if let Some(message) = body.message {
            return message;
        }
    }
    response.text().unwrap_or_default()
}

/// Map a non-2xx response to its generic classification.
///
/// 401 is `SessionExpired` here; the login operation refines it. The caller
/// is responsible for the 401 token-invalidation side effect before
/// classification.
pub(crate) fn classify_response(response: &HttpResponse) -> ApiError {
    match response.status {
        401 => ApiError::SessionExpired,
        404 => ApiError::NotFound(error_message(response)),
        status if (400..500).contains(&status) => ApiError::Validation {
            status,
            message: error_message(response),
        },
        status if (500..600).contains(&status) => ApiError::Server { status },
        status => ApiError::Unknown(format!("unexpected status {}", status)),
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::collections::HashMap;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_classify_401() {
        assert_eq!(
            classify_response(&response(401, r#"{"message":"Invalid email or password"}"#)),
            ApiError::SessionExpired
        );
    }

    #[test]
    fn test_classify_404_carries_message() {
        let err = classify_response(&response(404, r#"{"message":"User not found"}"#));
        assert_eq!(err, ApiError::NotFound("User not found".to_string()));
    }

    #[test]
    fn test_classify_other_4xx_is_validation() {
        let err = classify_response(&response(403, r#"{"message":"No scans left"}"#));
        assert_eq!(
            err,
            ApiError::Validation {
                status: 403,
                message: "No scans left".to_string()
            }
        );

        let err = classify_response(&response(400, "not json"));
        assert_eq!(
            err,
            ApiError::Validation {
                status: 400,
                message: "not json".to_string()
            }
        );
    }

    #[test]
    fn test_classify_5xx_is_server() {
        assert_eq!(
            classify_response(&response(500, "")),
            ApiError::Server { status: 500 }
        );
        assert_eq!(
            classify_response(&response(503, "")),
            ApiError::Server { status: 503 }
        );
    }

    #[test]
    fn test_retryability() {
        assert!(ApiError::NetworkUnreachable.is_retryable());
        assert!(ApiError::Server { status: 502 }.is_retryable());
        assert!(!ApiError::SessionExpired.is_retryable());
        assert!(!ApiError::InsufficientScans.is_retryable());
        assert!(!ApiError::Validation {
            status: 400,
            message: String::new()
        }
        .is_retryable());
    }
}
