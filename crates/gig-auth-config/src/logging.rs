//! Logging initialization for gig-auth binaries.
//!
//! Library crates only emit `tracing` events; this module is the single place
//! that turns configuration into a subscriber via the observability package.

use observability::{LogConfig, LogFormat};

/// Initialize the logging system.
///
/// The output format comes from `GIG_AUTH_LOG_FORMAT` (`compact` or `json`).
/// `RUST_LOG` still overrides `level` when set.
pub fn init_logging(level: &str) {
    let format = std::env::var("GIG_AUTH_LOG_FORMAT")
        .ok()
        .and_then(non_empty_env)
        .map(|raw| LogFormat::parse(&raw))
        .unwrap_or_default();

    observability::init_with_config(LogConfig {
        service_name: "gig-auth".into(),
        default_level: level.into(),
        format,
    });
}

fn non_empty_env(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
