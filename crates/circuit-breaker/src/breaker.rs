//! The breaker itself.

use crate::{CircuitBreakerConfig, CircuitBreakerError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls flow through; failures are counted.
    Closed,
    /// Calls are rejected without being invoked.
    Open,
    /// Trial calls are allowed to probe recovery.
    HalfOpen,
}

/// Point-in-time view of a breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    pub last_failure_time: Option<Instant>,
    pub next_attempt_time: Option<Instant>,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    /// Timestamps of failures still inside the monitoring window.
    failures: VecDeque<Instant>,
    success_count: u32,
    last_failure_time: Option<Instant>,
    next_attempt_time: Option<Instant>,
}

impl BreakerInner {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: VecDeque::new(),
            success_count: 0,
            last_failure_time: None,
            next_attempt_time: None,
        }
    }

    fn prune_stale_failures(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.failures.front() {
            if now.saturating_duration_since(oldest) > window {
                self.failures.pop_front();
            } else {
                break;
            }
        }
    }

    fn failure_count(&self) -> u32 {
        u32::try_from(self.failures.len()).unwrap_or(u32::MAX)
    }
}

/// Guards one external dependency.
///
/// State is behind a mutex that is never held across the guarded call, so a
/// single breaker can be shared as `Arc<CircuitBreaker>` between tasks.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner::closed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state, without side effects.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Counters and timestamps, with stale failures pruned.
    pub fn stats(&self) -> CircuitBreakerStats {
        let mut inner = self.inner.lock();
        inner.prune_stale_failures(Instant::now(), self.config.monitoring_period);
        CircuitBreakerStats {
            state: inner.state,
            failure_count: inner.failure_count(),
            success_count: inner.success_count,
            last_failure_time: inner.last_failure_time,
            next_attempt_time: inner.next_attempt_time,
        }
    }

    /// Force the circuit closed with every counter zeroed.
    pub fn reset(&self) {
        *self.inner.lock() = BreakerInner::closed();
        info!(breaker = %self.name, "Circuit manually reset to closed");
    }

    /// Run `operation` through the breaker.
    ///
    /// Rejects with [`CircuitBreakerError::Open`] while the circuit is open and
    /// the recovery timeout has not elapsed; otherwise invokes the operation
    /// and records its outcome.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.admit(Instant::now())?;

        match operation().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(error) => {
                self.record_failure(Instant::now());
                Err(CircuitBreakerError::Inner(error))
            }
        }
    }

    fn admit<E>(&self, now: Instant) -> Result<(), CircuitBreakerError<E>> {
        let mut inner = self.inner.lock();
        inner.prune_stale_failures(now, self.config.monitoring_period);

        if inner.state != CircuitState::Open {
            return Ok(());
        }

        match inner.next_attempt_time {
            Some(next) if now < next => {
                debug!(breaker = %self.name, "Circuit open, rejecting call");
                Err(CircuitBreakerError::Open {
                    name: self.name.clone(),
                    retry_after: next - now,
                })
            }
            _ => {
                inner.state = CircuitState::HalfOpen;
                inner.success_count = 0;
                info!(breaker = %self.name, "Recovery timeout elapsed, circuit half-open");
                Ok(())
            }
        }
    }

    fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.failures.clear();

        if inner.state == CircuitState::HalfOpen {
            inner.success_count += 1;
            if inner.success_count >= self.config.success_threshold {
                inner.state = CircuitState::Closed;
                inner.success_count = 0;
                inner.next_attempt_time = None;
                info!(breaker = %self.name, "Trial calls succeeded, circuit closed");
            }
        }
    }

    fn record_failure(&self, now: Instant) {
        let mut inner = self.inner.lock();
        inner.prune_stale_failures(now, self.config.monitoring_period);
        inner.failures.push_back(now);
        inner.last_failure_time = Some(now);

        let should_trip = match inner.state {
            CircuitState::HalfOpen => true,
            CircuitState::Closed => inner.failure_count() >= self.config.failure_threshold,
            CircuitState::Open => false,
        };

        if should_trip {
            let from = inner.state;
            inner.state = CircuitState::Open;
            inner.success_count = 0;
            inner.next_attempt_time = Some(now + self.config.recovery_timeout);
            warn!(
                breaker = %self.name,
                from = ?from,
                failure_count = inner.failure_count(),
                recovery_ms = self.config.recovery_timeout.as_millis() as u64,
                "Circuit opened"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    struct Boom;

    fn breaker(config: CircuitBreakerConfig) -> CircuitBreaker {
        CircuitBreaker::new("test", config)
    }

    async fn fail(cb: &CircuitBreaker, calls: &AtomicUsize) -> Result<(), CircuitBreakerError<Boom>> {
        cb.execute(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(Boom)
        })
        .await
    }

    async fn succeed(cb: &CircuitBreaker, calls: &AtomicUsize) -> Result<u32, CircuitBreakerError<Boom>> {
        cb.execute(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Boom>(7)
        })
        .await
    }

    async fn trip(cb: &CircuitBreaker) {
        let calls = AtomicUsize::new(0);
        for _ in 0..cb.config().failure_threshold {
            let _ = fail(cb, &calls).await;
        }
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_opens_only_at_threshold() {
        let cb = breaker(CircuitBreakerConfig::identity_exchange());
        let calls = AtomicUsize::new(0);

        for i in 1..5 {
            assert!(matches!(fail(&cb, &calls).await, Err(CircuitBreakerError::Inner(Boom))));
            assert_eq!(cb.state(), CircuitState::Closed, "tripped early after {} failures", i);
        }
        let _ = fail(&cb, &calls).await;
        assert_eq!(cb.state(), CircuitState::Open);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_rejects_without_invoking() {
        let cb = breaker(CircuitBreakerConfig::identity_exchange());
        trip(&cb).await;

        let calls = AtomicUsize::new(0);
        for _ in 0..10 {
            let result = succeed(&cb, &calls).await;
            assert!(matches!(result, Err(CircuitBreakerError::Open { .. })));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_timeout_boundary() {
        let cb = breaker(CircuitBreakerConfig::identity_exchange());
        trip(&cb).await;
        let calls = AtomicUsize::new(0);

        tokio::time::advance(Duration::from_secs(30) - Duration::from_millis(1)).await;
        match succeed(&cb, &calls).await {
            Err(CircuitBreakerError::Open { retry_after, .. }) => {
                assert_eq!(retry_after, Duration::from_millis(1));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(2)).await;
        assert_eq!(succeed(&cb, &calls).await.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // success_threshold is 2, so one trial success leaves it half-open
        assert_eq!(cb.state(), CircuitState::HalfOpen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_closes_after_success_threshold() {
        let cb = breaker(CircuitBreakerConfig::identity_exchange());
        trip(&cb).await;
        tokio::time::advance(Duration::from_secs(31)).await;

        let calls = AtomicUsize::new(0);
        succeed(&cb, &calls).await.unwrap();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert_eq!(cb.stats().success_count, 1);

        succeed(&cb, &calls).await.unwrap();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.stats().success_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_half_open_failure_reopens() {
        let cb = breaker(CircuitBreakerConfig::identity_exchange());
        trip(&cb).await;
        tokio::time::advance(Duration::from_secs(31)).await;

        let calls = AtomicUsize::new(0);
        succeed(&cb, &calls).await.unwrap();
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        let _ = fail(&cb, &calls).await;
        assert_eq!(cb.state(), CircuitState::Open);

        let stats = cb.stats();
        let next = stats.next_attempt_time.unwrap();
        assert_eq!(next - Instant::now(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_sdk_closes_after_one_success() {
        let cb = breaker(CircuitBreakerConfig::host_sdk());
        trip(&cb).await;
        tokio::time::advance(Duration::from_secs(16)).await;

        let calls = AtomicUsize::new(0);
        succeed(&cb, &calls).await.unwrap();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_failures_do_not_accumulate() {
        let cb = breaker(CircuitBreakerConfig::identity_exchange());
        let calls = AtomicUsize::new(0);

        // One failure every 20s never puts more than 4 inside a 60s window.
        for _ in 0..12 {
            let _ = fail(&cb, &calls).await;
            tokio::time::advance(Duration::from_secs(20)).await;
        }
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.stats().failure_count <= 3);

        tokio::time::advance(Duration::from_secs(120)).await;
        assert_eq!(cb.stats().failure_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_failure_count() {
        let cb = breaker(CircuitBreakerConfig::identity_exchange());
        let calls = AtomicUsize::new(0);

        for _ in 0..4 {
            let _ = fail(&cb, &calls).await;
        }
        succeed(&cb, &calls).await.unwrap();
        assert_eq!(cb.stats().failure_count, 0);

        for _ in 0..4 {
            let _ = fail(&cb, &calls).await;
        }
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_is_idempotent_from_any_state() {
        let cb = breaker(CircuitBreakerConfig::identity_exchange());
        let calls = AtomicUsize::new(0);

        // Closed with failures
        let _ = fail(&cb, &calls).await;
        cb.reset();
        assert_closed_and_zeroed(&cb);

        // Open
        trip(&cb).await;
        cb.reset();
        assert_closed_and_zeroed(&cb);
        cb.reset();
        assert_closed_and_zeroed(&cb);

        // HalfOpen
        trip(&cb).await;
        tokio::time::advance(Duration::from_secs(31)).await;
        succeed(&cb, &calls).await.unwrap();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.reset();
        assert_closed_and_zeroed(&cb);
    }

    fn assert_closed_and_zeroed(cb: &CircuitBreaker) {
        let stats = cb.stats();
        assert_eq!(stats.state, CircuitState::Closed);
        assert_eq!(stats.failure_count, 0);
        assert_eq!(stats.success_count, 0);
        assert!(stats.next_attempt_time.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_between_tasks() {
        let cb = Arc::new(breaker(CircuitBreakerConfig::host_sdk()));
        let mut handles = Vec::new();
        for _ in 0..3 {
            let cb = cb.clone();
            handles.push(tokio::spawn(async move {
                cb.execute(|| async { Err::<(), _>("down") }).await
            }));
        }
        for handle in handles {
            let _ = handle.await.unwrap();
        }
        assert_eq!(cb.state(), CircuitState::Open);
    }
}
