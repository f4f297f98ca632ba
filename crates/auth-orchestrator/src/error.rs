//! Handshake error types.

use auth_error_boundary::Classify;
use circuit_breaker::CircuitBreakerError;
use platform_capability_adapter::AdapterError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// A breaker rejected the call without making it
    #[error("Circuit '{name}' is open, retry in {}ms", .retry_after.as_millis())]
    CircuitOpen { name: String, retry_after: Duration },

    /// The host returned no identity token
    #[error("Identity token unavailable from host")]
    TokenUnavailable,

    /// The identity service refused or failed the exchange
    #[error("Identity exchange failed: {message}")]
    AuthExchange {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },

    #[error("Native session could not be established: {0}")]
    NativeSession(String),

    /// Logged and dropped inside the handshake
    #[error("Profile retrieval failed: {0}")]
    ProfileRetrieval(String),

    #[error("Host SDK failed to load: {0}")]
    SdkLoad(String),

    /// The latest health snapshot says an attempt is pointless
    #[error("Auth blocked by health check: {0}")]
    HealthGate(String),

    #[error("An auth handshake is already running")]
    RunInProgress,

    #[error("Invalid handshake transition: {0}")]
    InvalidStateTransition(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation timed out")]
    Timeout,

    #[error("Network unavailable")]
    NetworkUnavailable,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),
}

impl AuthError {
    /// Whether re-running the whole handshake may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AuthError::CircuitOpen { .. }
            | AuthError::Timeout
            | AuthError::NetworkUnavailable
            | AuthError::NativeSession(_)
            | AuthError::SdkLoad(_)
            | AuthError::HealthGate(_) => true,
            AuthError::AuthExchange { status, .. } => match status {
                None => true,
                Some(code) => *code >= 500 || *code == 408 || *code == 429,
            },
            AuthError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                e.status().is_some_and(|s| s.is_server_error())
            }
            _ => false,
        }
    }

    /// Short machine-readable code, used in the landing route query.
    pub fn code(&self) -> &str {
        match self {
            AuthError::CircuitOpen { .. } => "circuit_open",
            AuthError::TokenUnavailable => "token_unavailable",
            AuthError::AuthExchange { code: Some(code), .. } => code.as_str(),
            AuthError::AuthExchange { .. } => "exchange_failed",
            AuthError::NativeSession(_) => "native_session",
            AuthError::ProfileRetrieval(_) => "profile_retrieval",
            AuthError::SdkLoad(_) => "sdk_load",
            AuthError::HealthGate(_) => "health_gate",
            AuthError::RunInProgress => "run_in_progress",
            AuthError::InvalidStateTransition(_) => "invalid_state",
            AuthError::Http(_) => "http",
            AuthError::Json(_) => "invalid_response",
            AuthError::Timeout => "timeout",
            AuthError::NetworkUnavailable => "network_unavailable",
            AuthError::Config(_) => "config",
            AuthError::Adapter(_) => "adapter",
        }
    }
}

impl Classify for AuthError {
    fn recoverable_hint(&self) -> Option<bool> {
        match self {
            // Bridge failures carry only a host message; let the boundary
            // match on it.
            AuthError::Adapter(AdapterError::Bridge(_)) => None,
            other => Some(other.is_recoverable()),
        }
    }
}

impl From<CircuitBreakerError<AuthError>> for AuthError {
    fn from(err: CircuitBreakerError<AuthError>) -> Self {
        match err {
            CircuitBreakerError::Open { name, retry_after } => {
                AuthError::CircuitOpen { name, retry_after }
            }
            CircuitBreakerError::Inner(e) => e,
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
