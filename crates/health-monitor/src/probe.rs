//! Probe seam.

use crate::{HealthResult, HealthStatus};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// What a probe found. Timing and timestamps are added by the monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub status: HealthStatus,
    pub error: Option<String>,
    pub details: BTreeMap<String, serde_json::Value>,
}

impl ProbeReport {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            error: None,
            details: BTreeMap::new(),
        }
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Degraded,
            error: Some(reason.into()),
            details: BTreeMap::new(),
        }
    }

    pub fn unhealthy(reason: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            error: Some(reason.into()),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// One isolated dependency check.
///
/// An `Err` (or a panic) from `check` marks only this probe unhealthy.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self) -> HealthResult<ProbeReport>;
}

/// The runtime's own idea of whether the device has network access.
pub trait ConnectivitySignal: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Connectivity flag set from outside, e.g. by online/offline events.
#[derive(Debug)]
pub struct StaticConnectivity {
    online: AtomicBool,
}

impl StaticConnectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }
}

impl Default for StaticConnectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivitySignal for StaticConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }
}
