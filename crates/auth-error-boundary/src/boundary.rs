//! The boundary state machine.

use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Retry budget and backoff base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl BoundaryConfig {
    /// `2^attempt * base_delay`, with `attempt` starting at 1.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(multiplier)
    }
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// What the fallback screen shows and what gets reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub error_id: Uuid,
    pub message: String,
    pub recoverable: bool,
    /// Automatic retries spent before giving up.
    pub retries: u32,
    /// Text for the fallback screen.
    pub user_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryState {
    Idle,
    Retrying { attempt: u32, error_id: Uuid },
    Failed(FailureReport),
    Succeeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryDirective {
    /// Re-run the guarded flow from scratch after `delay`.
    RetryAfter {
        attempt: u32,
        delay: Duration,
        error_id: Uuid,
    },
    ShowFallback(FailureReport),
}

#[derive(Debug)]
pub struct ErrorBoundary {
    config: BoundaryConfig,
    state: BoundaryState,
    retry_count: u32,
}

impl ErrorBoundary {
    pub fn new(config: BoundaryConfig) -> Self {
        Self {
            config,
            state: BoundaryState::Idle,
            retry_count: 0,
        }
    }

    pub fn state(&self) -> &BoundaryState {
        &self.state
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Feed an error caught from the guarded flow.
    ///
    /// `connectivity_issue` only changes the wording shown to the user.
    pub fn on_error(
        &mut self,
        message: impl Into<String>,
        recoverable: bool,
        connectivity_issue: bool,
    ) -> BoundaryDirective {
        let message = message.into();
        let error_id = Uuid::new_v4();

        if recoverable && self.retry_count < self.config.max_retries {
            self.retry_count += 1;
            let attempt = self.retry_count;
            let delay = self.config.delay_for_attempt(attempt);
            info!(
                %error_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %message,
                "Recoverable auth failure, scheduling retry"
            );
            self.state = BoundaryState::Retrying { attempt, error_id };
            return BoundaryDirective::RetryAfter {
                attempt,
                delay,
                error_id,
            };
        }

        let user_message = if connectivity_issue {
            "Check your connection and try again."
        } else if recoverable {
            "Something went wrong. Please try again."
        } else {
            "We couldn't sign you in."
        };
        let report = FailureReport {
            error_id,
            message,
            recoverable,
            retries: self.retry_count,
            user_message: user_message.to_string(),
        };
        warn!(
            error_id = %report.error_id,
            recoverable,
            retries = report.retries,
            error = %report.message,
            "Auth flow failed"
        );
        self.state = BoundaryState::Failed(report.clone());
        BoundaryDirective::ShowFallback(report)
    }

    pub fn on_success(&mut self) {
        self.state = BoundaryState::Succeeded;
        self.retry_count = 0;
    }

    /// The fallback's retry action: zero the budget and start over.
    pub fn manual_retry(&mut self) {
        self.state = BoundaryState::Idle;
        self.retry_count = 0;
    }
}

impl Default for ErrorBoundary {
    fn default() -> Self {
        Self::new(BoundaryConfig::default())
    }
}
