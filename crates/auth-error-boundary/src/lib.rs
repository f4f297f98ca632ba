//! Failure containment around the auth handshake.
//!
//! [`ErrorBoundary`] is a plain state machine:
//!
//! ```text
//!   Idle ──error, recoverable, budget left──► Retrying(n) ──error──► ...
//!    │                                           │
//!    │ success                                   │ success
//!    ▼                                           ▼
//!   Succeeded                                 Succeeded
//!
//!   any state ──error, fatal or budget spent──► Failed ──manual_retry──► Idle
//! ```
//!
//! [`BoundaryRunner`] drives it: it runs the guarded flow on its own task,
//! sleeps the backoff between attempts, publishes state for the UI, and can
//! be torn down while a retry is pending.

mod boundary;
mod classify;
mod runner;

pub use boundary::{BoundaryConfig, BoundaryDirective, BoundaryState, ErrorBoundary, FailureReport};
pub use classify::{is_recoverable, matches_transient_pattern, Classify, TRANSIENT_PATTERNS};
pub use runner::{BoundaryOutcome, BoundaryRunner, ErrorReporter, LogReporter};
