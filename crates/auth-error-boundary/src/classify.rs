//! Recoverable vs fatal.

use std::error::Error;
use std::io;

/// Lowercase message fragments that mark an error as transient.
pub const TRANSIENT_PATTERNS: &[&str] = &[
    "network",
    "timeout",
    "timed out",
    "connection",
    "unavailable",
    "fetch failed",
    "auth/network-request-failed",
    "econnreset",
    "econnrefused",
];

/// Errors that know whether retrying can help.
///
/// Returning `None` falls back to message matching.
pub trait Classify {
    fn recoverable_hint(&self) -> Option<bool> {
        None
    }
}

impl Classify for io::Error {
    fn recoverable_hint(&self) -> Option<bool> {
        match self.kind() {
            io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::Interrupted => Some(true),
            _ => None,
        }
    }
}

/// Whether any error in the `source()` chain matches a transient pattern.
pub fn matches_transient_pattern(error: &(dyn Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        let message = err.to_string().to_ascii_lowercase();
        if TRANSIENT_PATTERNS.iter().any(|p| message.contains(p)) {
            return true;
        }
        current = err.source();
    }
    false
}

pub fn is_recoverable<E>(error: &E) -> bool
where
    E: Classify + Error + 'static,
{
    error
        .recoverable_hint()
        .unwrap_or_else(|| matches_transient_pattern(error))
}
