//! One capability surface over every host runtime.
//!
//! The process detects its host once ([`detect_platform`]), builds the
//! matching [`CapabilityAdapter`] once ([`AdapterSlot::select`]), and every
//! consumer programs against the adapter's `auth`, `storage`, `navigation`
//! and optional `notifications` without knowing which variant is active.
//!
//! | Host                | Auth                    | Storage                               |
//! |---------------------|-------------------------|---------------------------------------|
//! | generic web         | session provider        | browser-local                         |
//! | embedded mini-app   | host bridge redirect    | browser-local, degrading to session   |
//! | native iOS          | native shell sign-in    | native secure store                   |
//! | native Android      | iOS adapter, no Apple   | native secure store                   |

mod adapters;
mod bridge;
mod capability;
mod detect;
mod navigation;
mod profile;
mod user;

#[cfg(test)]
mod testing;

pub use adapters::{MiniAppAuth, NativeAuth, RestrictedAuth, WebAuth};
pub use bridge::{
    HostEnvironment, HostProfile, MiniAppBridge, NativeOs, NativeShellBridge, SessionProvider,
};
pub use capability::{
    AuthCapability, CapabilityAdapter, LoginOutcome, NavigationCapability, NotificationCapability,
};
pub use detect::{create_adapter, detect_platform, AdapterSlot};
pub use navigation::HistoryNavigator;
pub use profile::{AuthMethod, PlatformName, PlatformProfile, StorageClass};
pub use user::{CurrentUser, CurrentUserContext};

use platform_storage::StorageError;
use thiserror::Error;

/// Errors raised through the capability surface.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Auth method {method} is not supported on {platform}")]
    UnsupportedMethod {
        method: AuthMethod,
        platform: PlatformName,
    },

    #[error("Host bridge error: {0}")]
    Bridge(String),

    #[error("Session provider error: {0}")]
    Provider(String),

    #[error("Required host bridge is missing: {0}")]
    MissingBridge(&'static str),

    #[error("Notifications error: {0}")]
    Notifications(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type AdapterResult<T> = Result<T, AdapterError>;
