//! Health monitoring for the auth layer.
//!
//! A [`HealthMonitor`] runs a fixed set of [`HealthProbe`]s, each isolated on
//! its own task, and folds their results into a [`HealthSnapshot`] whose
//! overall status is the worst individual status. Callers consult the latest
//! snapshot before attempting an auth handshake.
//!
//! Built-in probes:
//! - [`ConnectivityProbe`]: whether the device believes it is online
//! - [`BackendReachabilityProbe`]: `GET /health` on the identity service
//! - [`StorageProbe`]: write/read/remove round trip on the key-value store
//! - [`SessionFreshnessProbe`]: inactivity of the stored session

mod error;
mod monitor;
mod probe;
mod probes;
mod snapshot;

pub use error::{HealthError, HealthResult, StorageIntegrityError};
pub use monitor::{HealthMonitor, MonitorConfig};
pub use probe::{ConnectivitySignal, HealthProbe, ProbeReport, StaticConnectivity};
pub use probes::{
    BackendReachabilityProbe, ConnectivityProbe, SessionFreshnessProbe, StorageProbe,
    BACKEND_PROBE_TIMEOUT, SESSION_STALE_AFTER,
};
pub use snapshot::{HealthCheckResult, HealthSnapshot, HealthStatus};
