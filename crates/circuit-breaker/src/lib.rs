//! Circuit breaker for calls to external dependencies.
//!
//! A breaker wraps any async operation and trips between three states:
//!
//! ```text
//!            failures >= failure_threshold
//!            (within monitoring_period)
//!  ┌────────┐ ─────────────────────────────► ┌────────┐
//!  │ Closed │                                │  Open  │ ◄──┐
//!  └────────┘ ◄──────────┐                   └───┬────┘    │
//!                        │                       │ recovery_timeout elapsed
//!     successes >= success_threshold             ▼         │ any failure
//!                        │                   ┌──────────┐  │
//!                        └────────────────── │ HalfOpen │ ─┘
//!                                            └──────────┘
//! ```
//!
//! While open, `execute` fails fast with [`CircuitBreakerError::Open`] and the
//! wrapped operation is never invoked. Operation errors are handed back
//! untouched inside [`CircuitBreakerError::Inner`].

mod breaker;
mod config;
mod error;

pub use breaker::{CircuitBreaker, CircuitBreakerStats, CircuitState};
pub use config::CircuitBreakerConfig;
pub use error::CircuitBreakerError;
