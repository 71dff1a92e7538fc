//! Per-call request context and retry constants.

use std::time::Duration;

/// Maximum number of retries after the initial attempt.
pub const MAX_RETRIES: u32 = 3;

/// Fixed delay between attempts.
pub const RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Ephemeral state for one outgoing call.
///
/// The context is an immutable value threaded through the retry loop; each
/// retry produces the next context rather than mutating shared request
/// state. Discarded once the call completes or retries are exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// Endpoint label, for logs only.
    pub endpoint: &'static str,
    /// Attempt number, `0..=max_retries`; 0 is the initial attempt.
    pub attempt: u32,
    /// Retry budget for this call.
    pub max_retries: u32,
}

impl RequestContext {
    pub fn new(endpoint: &'static str, max_retries: u32) -> Self {
        Self {
            endpoint,
            attempt: 0,
            max_retries,
        }
    }

    /// Whether another attempt is allowed.
    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_retries
    }

    /// The context for the following attempt.
    pub fn next_attempt(self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_counts_attempts() {
        let ctx = RequestContext::new("/health", MAX_RETRIES);
        assert_eq!(ctx.attempt, 0);
        assert!(ctx.can_retry());

        let ctx = ctx.next_attempt().next_attempt().next_attempt();
        assert_eq!(ctx.attempt, 3);
        assert!(!ctx.can_retry());
    }

    #[test]
    fn test_context_is_value_semantics() {
        let first = RequestContext::new("/plants/predict", MAX_RETRIES);
        let second = first.next_attempt();

        assert_eq!(first.attempt, 0);
        assert_eq!(second.attempt, 1);
        assert_eq!(second.endpoint, "/plants/predict");
    }

    #[test]
    fn test_zero_budget_never_retries() {
        let ctx = RequestContext::new("/health", 0);
        assert!(!ctx.can_retry());
    }
}
