//! Periodic probe runner.

use crate::{HealthCheckResult, HealthProbe, HealthSnapshot, HealthStatus, ProbeReport};
use chrono::Utc;
use futures_util::future::join_all;
use gig_auth_config::Config;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Whether the periodic loop may run at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// `false` in local development unless explicitly opted in. When
    /// disabled, `start_monitoring` does nothing; `check_now` still works.
    pub enabled: bool,
}

impl MonitorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.health_monitoring_enabled(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

struct MonitorTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Runs probes on demand or on an interval and keeps the latest snapshot.
pub struct HealthMonitor {
    config: MonitorConfig,
    probes: Arc<Vec<Arc<dyn HealthProbe>>>,
    latest: Arc<RwLock<HealthSnapshot>>,
    task: Mutex<Option<MonitorTask>>,
}

impl HealthMonitor {
    pub fn new(config: MonitorConfig, probes: Vec<Arc<dyn HealthProbe>>) -> Self {
        Self {
            config,
            probes: Arc::new(probes),
            latest: Arc::new(RwLock::new(HealthSnapshot::empty())),
            task: Mutex::new(None),
        }
    }

    /// Spawn the periodic loop. The first round runs immediately.
    ///
    /// Returns `false` without spawning when monitoring is disabled for this
    /// execution context. Restarts the loop if it was already running.
    pub fn start_monitoring(&self, interval: Duration) -> bool {
        if !self.config.enabled {
            debug!("Health monitoring suppressed in development context");
            return false;
        }

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let probes = self.probes.clone();
        let latest = self.latest.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        debug!("Health monitor received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        let snapshot = run_probes(&probes).await;
                        if snapshot.status != HealthStatus::Healthy {
                            warn!(status = snapshot.status.as_str(), "Health check reported problems");
                        }
                        *latest.write() = snapshot;
                    }
                }
            }

            debug!("Health monitor task stopped");
        });

        let previous = self.task.lock().replace(MonitorTask {
            shutdown: shutdown_tx,
            handle,
        });
        if let Some(previous) = previous {
            stop_task(previous);
        }

        info!(
            interval_ms = interval.as_millis() as u64,
            probes = self.probes.len(),
            "Health monitoring started"
        );
        true
    }

    /// Cancel the periodic loop. Safe to call when not running.
    pub fn stop_monitoring(&self) {
        if let Some(task) = self.task.lock().take() {
            stop_task(task);
            info!("Health monitoring stopped");
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Run every probe once and store the result.
    pub async fn check_now(&self) -> HealthSnapshot {
        let snapshot = run_probes(&self.probes).await;
        *self.latest.write() = snapshot.clone();
        snapshot
    }

    /// Latest snapshot; healthy and empty before the first round.
    pub fn overall_health(&self) -> HealthSnapshot {
        self.latest.read().clone()
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            stop_task(task);
        }
    }
}

fn stop_task(task: MonitorTask) {
    let _ = task.shutdown.send(());
    task.handle.abort();
}

/// Run all probes concurrently, each on its own task, so one probe's error
/// or panic degrades only that probe.
async fn run_probes(probes: &[Arc<dyn HealthProbe>]) -> HealthSnapshot {
    let handles: Vec<_> = probes
        .iter()
        .map(|probe| {
            let probe = probe.clone();
            let started = Instant::now();
            let handle = tokio::spawn(async move { probe.check().await });
            (started, handle)
        })
        .collect();

    let names: Vec<String> = probes.iter().map(|p| p.name().to_string()).collect();
    let outcomes = join_all(handles.into_iter().map(|(started, handle)| async move {
        let outcome = handle.await;
        (started.elapsed(), outcome)
    }))
    .await;

    let results = names
        .into_iter()
        .zip(outcomes)
        .map(|(service, (elapsed, outcome))| {
            let report = match outcome {
                Ok(Ok(report)) => report,
                Ok(Err(e)) => {
                    debug!(probe = %service, error = %e, "Health probe failed");
                    ProbeReport::unhealthy(e.to_string())
                }
                Err(join_error) if join_error.is_panic() => {
                    warn!(probe = %service, "Health probe panicked");
                    ProbeReport::unhealthy("Probe panicked")
                }
                Err(_) => ProbeReport::unhealthy("Probe cancelled"),
            };
            HealthCheckResult {
                service,
                status: report.status,
                response_time_ms: elapsed.as_millis() as u64,
                last_checked: Utc::now(),
                error: report.error,
                details: report.details,
            }
        })
        .collect();

    HealthSnapshot::from_results(results)
}
