//! Health probe errors.

use platform_storage::StorageError;
use thiserror::Error;

/// The storage round trip read back something other than what was written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Storage integrity check failed: wrote {expected:?}, read back {actual:?}")]
pub struct StorageIntegrityError {
    pub expected: String,
    pub actual: Option<String>,
}

/// Errors a probe can hit while checking. The monitor turns every one of
/// these into an `unhealthy` result for that probe only.
#[derive(Error, Debug)]
pub enum HealthError {
    #[error(transparent)]
    StorageIntegrity(#[from] StorageIntegrityError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Probe failed: {0}")]
    Probe(String),
}

pub type HealthResult<T> = Result<T, HealthError>;
