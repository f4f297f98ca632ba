//! Core configuration, paths, and logging setup for the gig-auth layer.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, ExecutionContext, UserRole, DEFAULT_EXCHANGE_PATH, DEFAULT_EXCHANGE_TIMEOUT_SECS,
    DEFAULT_HEALTH_INTERVAL_MS, DEFAULT_IDENTITY_SERVICE_URL, DEFAULT_LOG_LEVEL,
};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use paths::Paths;
