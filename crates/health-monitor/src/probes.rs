//! The built-in probes.

use crate::{
    ConnectivitySignal, HealthError, HealthProbe, HealthResult, ProbeReport, StorageIntegrityError,
};
use async_trait::async_trait;
use chrono::Utc;
use platform_storage::{KeyValueStore, SessionStore, StorageError, StorageKeys};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Request timeout for the backend reachability check.
pub const BACKEND_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Inactivity after which a stored session is reported as degraded.
pub const SESSION_STALE_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

// ==========================================
// Connectivity
// ==========================================

pub struct ConnectivityProbe {
    signal: Arc<dyn ConnectivitySignal>,
}

impl ConnectivityProbe {
    pub const NAME: &'static str = "connectivity";

    pub fn new(signal: Arc<dyn ConnectivitySignal>) -> Self {
        Self { signal }
    }
}

#[async_trait]
impl HealthProbe for ConnectivityProbe {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn check(&self) -> HealthResult<ProbeReport> {
        if self.signal.is_online() {
            Ok(ProbeReport::healthy().with_detail("online", true))
        } else {
            Ok(ProbeReport::unhealthy("Device reports no network access").with_detail("online", false))
        }
    }
}

// ==========================================
// Backend reachability
// ==========================================

/// `GET {identity_service_url}/health`: 2xx is healthy, a timeout is
/// degraded, anything else is unhealthy.
pub struct BackendReachabilityProbe {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl BackendReachabilityProbe {
    pub const NAME: &'static str = "backend";

    pub fn new(client: reqwest::Client, identity_service_url: &Url) -> HealthResult<Self> {
        let base = identity_service_url.as_str().trim_end_matches('/');
        let url = Url::parse(&format!("{}/health", base))?;
        Ok(Self {
            client,
            url,
            timeout: BACKEND_PROBE_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl HealthProbe for BackendReachabilityProbe {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn check(&self) -> HealthResult<ProbeReport> {
        let result = self
            .client
            .get(self.url.clone())
            .timeout(self.timeout)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                Ok(ProbeReport::healthy().with_detail("http_status", response.status().as_u16()))
            }
            Ok(response) => {
                let status = response.status();
                Ok(ProbeReport::unhealthy(format!("Backend returned HTTP {}", status))
                    .with_detail("http_status", status.as_u16()))
            }
            Err(e) if e.is_timeout() => {
                debug!(url = %self.url, "Backend health check timed out");
                Ok(ProbeReport::degraded(format!(
                    "Backend did not answer within {}ms",
                    self.timeout.as_millis()
                )))
            }
            Err(e) => Err(HealthError::Http(e)),
        }
    }
}

// ==========================================
// Storage
// ==========================================

/// Round trip of a throwaway key through the key-value store.
pub struct StorageProbe {
    store: Arc<dyn KeyValueStore>,
}

impl StorageProbe {
    pub const NAME: &'static str = "storage";

    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HealthProbe for StorageProbe {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn check(&self) -> HealthResult<ProbeReport> {
        let expected = format!("probe-{}", Utc::now().timestamp_millis());
        self.store.set(StorageKeys::HEALTH_CHECK, &expected)?;
        let actual = self.store.get(StorageKeys::HEALTH_CHECK)?;
        self.store.remove(StorageKeys::HEALTH_CHECK)?;

        if actual.as_deref() != Some(expected.as_str()) {
            return Err(StorageIntegrityError { expected, actual }.into());
        }
        Ok(ProbeReport::healthy())
    }
}

// ==========================================
// Session freshness
// ==========================================

/// Reports a stored session as degraded once it has been idle too long.
/// Being logged out is healthy.
pub struct SessionFreshnessProbe {
    sessions: SessionStore,
    stale_after: Duration,
}

impl SessionFreshnessProbe {
    pub const NAME: &'static str = "session";

    pub fn new(sessions: SessionStore) -> Self {
        Self {
            sessions,
            stale_after: SESSION_STALE_AFTER,
        }
    }
}

#[async_trait]
impl HealthProbe for SessionFreshnessProbe {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn check(&self) -> HealthResult<ProbeReport> {
        if self.sessions.session_id()?.is_none() {
            return Ok(ProbeReport::healthy().with_detail("has_session", false));
        }

        let last_activity = match self.sessions.last_activity_at() {
            Ok(Some(at)) => at,
            Ok(None) => {
                return Ok(ProbeReport::degraded("Session has no recorded activity")
                    .with_detail("has_session", true));
            }
            // Dropped and reported degraded; this probe never reports unhealthy
            Err(StorageError::Encoding(e)) => {
                warn!(error = %e, "Discarding unreadable activity timestamp");
                self.sessions.clear_activity()?;
                return Ok(ProbeReport::degraded("Unreadable activity timestamp")
                    .with_detail("has_session", true));
            }
            Err(e) => return Err(e.into()),
        };

        let idle = (Utc::now() - last_activity).to_std().unwrap_or_default();
        let report = if idle > self.stale_after {
            ProbeReport::degraded(format!("Session inactive for {}h", idle.as_secs() / 3600))
        } else {
            ProbeReport::healthy()
        };
        Ok(report
            .with_detail("has_session", true)
            .with_detail("idle_secs", idle.as_secs()))
    }
}
