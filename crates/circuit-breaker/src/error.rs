//! Breaker error type.

use std::time::Duration;
use thiserror::Error;

/// Error returned by [`crate::CircuitBreaker::execute`].
#[derive(Error, Debug)]
pub enum CircuitBreakerError<E> {
    /// The circuit is open; the operation was not invoked.
    #[error("Circuit '{name}' is open, retry in {}ms", .retry_after.as_millis())]
    Open {
        /// Breaker name, for logs and user-facing messages.
        name: String,
        /// Time left until a trial call is allowed.
        retry_after: Duration,
    },
    /// The operation ran and failed with its own error.
    #[error(transparent)]
    Inner(E),
}

impl<E> CircuitBreakerError<E> {
    pub fn is_open(&self) -> bool {
        matches!(self, CircuitBreakerError::Open { .. })
    }

    /// The operation's own error, if the operation ran.
    pub fn into_inner(self) -> Option<E> {
        match self {
            CircuitBreakerError::Inner(e) => Some(e),
            CircuitBreakerError::Open { .. } => None,
        }
    }
}
