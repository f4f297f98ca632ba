//! Probe results and their aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Probe verdict, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

/// Outcome of one probe run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub service: String,
    pub status: HealthStatus,
    pub response_time_ms: u64,
    pub last_checked: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, serde_json::Value>,
}

/// Latest result per probe plus the worst status among them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub checks: Vec<HealthCheckResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

impl HealthSnapshot {
    /// Snapshot before any probe has run. Counts as healthy.
    pub fn empty() -> Self {
        Self {
            status: HealthStatus::Healthy,
            checks: Vec::new(),
            checked_at: None,
        }
    }

    pub fn from_results(checks: Vec<HealthCheckResult>) -> Self {
        let status = checks
            .iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);
        Self {
            status,
            checks,
            checked_at: Some(Utc::now()),
        }
    }

    pub fn check(&self, service: &str) -> Option<&HealthCheckResult> {
        self.checks.iter().find(|c| c.service == service)
    }

    /// Whether an auth attempt is worth making at all.
    pub fn permits_auth(&self) -> bool {
        self.status != HealthStatus::Unhealthy
    }

    /// Whether the trouble, if any, is the network or the backend rather than
    /// the device. Used to pick between "check your connection" and
    /// "try again".
    pub fn is_connectivity_issue(&self) -> bool {
        [crate::ConnectivityProbe::NAME, crate::BackendReachabilityProbe::NAME]
            .iter()
            .filter_map(|name| self.check(name))
            .any(|c| c.status != HealthStatus::Healthy)
    }
}

impl Default for HealthSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
