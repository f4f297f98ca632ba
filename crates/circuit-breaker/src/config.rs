//! Breaker tuning.

use std::time::Duration;

/// Thresholds and timings for a [`crate::CircuitBreaker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Failures inside `monitoring_period` that trip a closed circuit.
    pub failure_threshold: u32,
    /// How long an open circuit rejects calls before allowing a trial.
    pub recovery_timeout: Duration,
    /// Window after which a recorded failure no longer counts.
    pub monitoring_period: Duration,
    /// Consecutive half-open successes needed to close the circuit.
    pub success_threshold: u32,
}

impl CircuitBreakerConfig {
    /// Backend identity exchange: tolerant, slow to recover.
    pub const fn identity_exchange() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            monitoring_period: Duration::from_secs(60),
            success_threshold: 2,
        }
    }

    /// Embedded host SDK: fails fast and recovers fast.
    pub const fn host_sdk() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(15),
            monitoring_period: Duration::from_secs(30),
            success_threshold: 1,
        }
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::identity_exchange()
    }
}
