//! Async driver for the boundary.

use crate::{is_recoverable, BoundaryConfig, BoundaryDirective, BoundaryState, Classify, ErrorBoundary, FailureReport};
use health_monitor::HealthMonitor;
use parking_lot::Mutex;
use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};
use uuid::Uuid;

/// External sink for failures the user chose to report.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error_id: Uuid, message: &str);
}

/// Reporter that only writes to the log.
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, error_id: Uuid, message: &str) {
        error!(%error_id, error = %message, "User reported auth failure");
    }
}

#[derive(Debug)]
pub enum BoundaryOutcome<T> {
    Succeeded(T),
    Failed(FailureReport),
    /// Torn down before the flow resolved.
    Cancelled,
}

impl<T> BoundaryOutcome<T> {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, BoundaryOutcome::Succeeded(_))
    }
}

/// Runs a guarded flow, retrying it from scratch on recoverable errors.
///
/// Each attempt runs on its own task, so a panic inside the flow is caught
/// and treated as fatal. Only one attempt is in flight at a time: the next
/// one starts after the previous has fully resolved and the backoff elapsed.
pub struct BoundaryRunner {
    machine: Mutex<ErrorBoundary>,
    state_tx: watch::Sender<BoundaryState>,
    shutdown_tx: watch::Sender<bool>,
    reporter: Arc<dyn ErrorReporter>,
    health: Option<Arc<HealthMonitor>>,
}

impl BoundaryRunner {
    pub fn new(config: BoundaryConfig, reporter: Arc<dyn ErrorReporter>) -> Self {
        let (state_tx, _) = watch::channel(BoundaryState::Idle);
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            machine: Mutex::new(ErrorBoundary::new(config)),
            state_tx,
            shutdown_tx,
            reporter,
            health: None,
        }
    }

    /// Use the monitor's latest snapshot to word the fallback message.
    pub fn with_health(mut self, health: Arc<HealthMonitor>) -> Self {
        self.health = Some(health);
        self
    }

    pub fn state(&self) -> BoundaryState {
        self.state_tx.borrow().clone()
    }

    /// Watch state changes, e.g. to show "retrying…".
    pub fn subscribe(&self) -> watch::Receiver<BoundaryState> {
        self.state_tx.subscribe()
    }

    pub async fn run<T, E, F, Fut>(&self, mut flow: F) -> BoundaryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Classify + Error + Send + Sync + 'static,
    {
        let mut shutdown = self.shutdown_tx.subscribe();

        loop {
            if *shutdown.borrow() {
                return BoundaryOutcome::Cancelled;
            }

            let mut attempt = tokio::spawn(flow());
            let joined = tokio::select! {
                _ = shutdown.changed() => {
                    attempt.abort();
                    debug!("Boundary torn down during attempt");
                    return BoundaryOutcome::Cancelled;
                }
                joined = &mut attempt => joined,
            };

            let directive = match joined {
                Ok(Ok(value)) => {
                    self.machine.lock().on_success();
                    self.publish();
                    return BoundaryOutcome::Succeeded(value);
                }
                Ok(Err(e)) => {
                    let recoverable = is_recoverable(&e);
                    self.machine
                        .lock()
                        .on_error(e.to_string(), recoverable, self.connectivity_issue())
                }
                Err(join_error) => {
                    let message = if join_error.is_panic() {
                        "Auth flow panicked"
                    } else {
                        "Auth flow was cancelled"
                    };
                    self.machine.lock().on_error(message, false, false)
                }
            };
            self.publish();

            match directive {
                BoundaryDirective::RetryAfter { attempt, delay, .. } => {
                    tokio::select! {
                        _ = shutdown.changed() => {
                            info!(attempt, "Pending retry cancelled by teardown");
                            return BoundaryOutcome::Cancelled;
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                BoundaryDirective::ShowFallback(report) => return BoundaryOutcome::Failed(report),
            }
        }
    }

    /// The fallback's retry action. Call `run` again afterwards.
    pub fn manual_retry(&self) {
        self.machine.lock().manual_retry();
        self.publish();
    }

    /// The fallback's report action.
    pub fn report(&self, report: &FailureReport) {
        self.reporter.report(report.error_id, &report.message);
    }

    /// Cancel the in-flight attempt or pending retry.
    pub fn teardown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    fn publish(&self) {
        let state = self.machine.lock().state().clone();
        self.state_tx.send_replace(state);
    }

    fn connectivity_issue(&self) -> bool {
        self.health
            .as_ref()
            .is_some_and(|h| h.overall_health().is_connectivity_issue())
    }
}

impl Drop for BoundaryRunner {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
    }
}
