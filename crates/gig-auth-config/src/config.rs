//! Configuration management for the auth layer.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default identity service URL (can be overridden at compile time via GIG_AUTH_IDENTITY_URL).
pub const DEFAULT_IDENTITY_SERVICE_URL: &str = match option_env!("GIG_AUTH_IDENTITY_URL") {
    Some(url) => url,
    None => "https://identity.gig-marketplace.dev",
};

/// Path of the token exchange endpoint on the identity service.
pub const DEFAULT_EXCHANGE_PATH: &str = "/v1/auth/exchange";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default health monitoring interval.
pub const DEFAULT_HEALTH_INTERVAL_MS: u64 = 30_000;

/// Default transport timeout for the identity exchange call.
pub const DEFAULT_EXCHANGE_TIMEOUT_SECS: u64 = 15;

/// Which side of the marketplace the embedded host integration serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Seeker,
    Employer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Seeker => "seeker",
            UserRole::Employer => "employer",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "seeker" | "job_seeker" | "jobseeker" => Some(UserRole::Seeker),
            "employer" => Some(UserRole::Employer),
            _ => None,
        }
    }
}

/// Where the process is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    /// Local iterative development.
    Development,
    #[default]
    Production,
}

impl ExecutionContext {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" | "local" => Some(ExecutionContext::Development),
            "prod" | "production" => Some(ExecutionContext::Production),
            _ => None,
        }
    }
}

/// Main configuration for the auth layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Base URL of the backend identity service.
    pub identity_service_url: String,
    /// Path of the token exchange endpoint.
    pub exchange_path: String,
    /// Role variant of the embedded host integration.
    pub role: UserRole,
    /// Embedded host app identifier for the seeker variant.
    pub seeker_app_id: Option<String>,
    /// Embedded host app identifier for the employer variant.
    pub employer_app_id: Option<String>,
    /// Execution context; health monitoring is suppressed in development.
    pub execution_context: ExecutionContext,
    /// Run the health monitor even in development.
    pub monitor_in_development: bool,
    /// Health monitoring tick interval.
    pub health_interval_ms: u64,
    /// Transport timeout for the identity exchange call.
    pub exchange_timeout_secs: u64,
    /// Route shown to unauthenticated users.
    pub landing_route: String,
    /// Post-login route for seekers.
    pub seeker_home_route: String,
    /// Post-login route for employers.
    pub employer_home_route: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            identity_service_url: DEFAULT_IDENTITY_SERVICE_URL.to_string(),
            exchange_path: DEFAULT_EXCHANGE_PATH.to_string(),
            role: UserRole::default(),
            seeker_app_id: None,
            employer_app_id: None,
            execution_context: ExecutionContext::default(),
            monitor_in_development: false,
            health_interval_ms: DEFAULT_HEALTH_INTERVAL_MS,
            exchange_timeout_secs: DEFAULT_EXCHANGE_TIMEOUT_SECS,
            landing_route: "/".to_string(),
            seeker_home_route: "/seeker/jobs".to_string(),
            employer_home_route: "/employer/dashboard".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the config file if present, then apply
    /// environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            debug!(path = %config_path.display(), "Loading config file");
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply `GIG_AUTH_*` overrides from an arbitrary lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(level) = get("GIG_AUTH_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(url) = get("GIG_AUTH_IDENTITY_URL") {
            self.identity_service_url = url.trim_end_matches('/').to_string();
        }
        if let Some(role) = get("GIG_AUTH_ROLE").and_then(|r| UserRole::parse(&r)) {
            self.role = role;
        }
        if let Some(id) = get("GIG_AUTH_SEEKER_APP_ID") {
            self.seeker_app_id = Some(id);
        }
        if let Some(id) = get("GIG_AUTH_EMPLOYER_APP_ID") {
            self.employer_app_id = Some(id);
        }
        if let Some(ctx) = get("GIG_AUTH_ENV").and_then(|c| ExecutionContext::parse(&c)) {
            self.execution_context = ctx;
        }
        if let Some(flag) = get("GIG_AUTH_MONITOR_IN_DEV") {
            self.monitor_in_development = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        if let Some(ms) = get("GIG_AUTH_HEALTH_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.health_interval_ms = ms;
        }
        if let Some(secs) = get("GIG_AUTH_EXCHANGE_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.exchange_timeout_secs = secs;
        }
    }

    /// Reject configurations the auth layer cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        self.identity_service_url()?;
        if self.exchange_timeout_secs == 0 {
            return Err(CoreError::Config(
                "exchange_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.health_interval_ms == 0 {
            return Err(CoreError::Config(
                "health_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the identity service URL as a parsed URL.
    pub fn identity_service_url(&self) -> CoreResult<Url> {
        Url::parse(&self.identity_service_url).map_err(CoreError::from)
    }

    /// Full URL of the token exchange endpoint. Any path on the base URL is
    /// kept, the same way the backend health check resolves `/health`.
    pub fn exchange_url(&self) -> CoreResult<Url> {
        let base = self.identity_service_url()?;
        let url = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            self.exchange_path.trim_start_matches('/')
        );
        Url::parse(&url).map_err(CoreError::from)
    }

    /// Embedded host app identifier for the configured role.
    pub fn mini_app_id(&self) -> Option<&str> {
        match self.role {
            UserRole::Seeker => self.seeker_app_id.as_deref(),
            UserRole::Employer => self.employer_app_id.as_deref(),
        }
    }

    /// Route to navigate to once a user of the configured role is signed in.
    pub fn post_login_route(&self) -> &str {
        match self.role {
            UserRole::Seeker => &self.seeker_home_route,
            UserRole::Employer => &self.employer_home_route,
        }
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms)
    }

    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange_timeout_secs)
    }

    /// Whether periodic health monitoring should run in this context.
    pub fn health_monitoring_enabled(&self) -> bool {
        self.execution_context == ExecutionContext::Production || self.monitor_in_development
    }
}
