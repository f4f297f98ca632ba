//! The uniform surface every adapter provides.

use crate::{AdapterResult, AuthMethod, CurrentUser, CurrentUserContext, PlatformProfile};
use async_trait::async_trait;
use platform_storage::KeyValueStore;
use std::sync::Arc;

/// Result of starting a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    SignedIn(Arc<CurrentUser>),
    /// Control left for the host's login page; the callback screen finishes
    /// the handshake.
    Redirected,
}

#[async_trait]
pub trait AuthCapability: Send + Sync {
    async fn login(&self, method: AuthMethod) -> AdapterResult<LoginOutcome>;

    async fn logout(&self) -> AdapterResult<()>;

    fn current_user(&self) -> Option<Arc<CurrentUser>>;
}

pub trait NavigationCapability: Send + Sync {
    fn navigate(&self, path: &str);

    fn go_back(&self);

    /// Swap the current route without adding history.
    fn replace(&self, path: &str);

    fn current_route(&self) -> String;
}

#[async_trait]
pub trait NotificationCapability: Send + Sync {
    async fn request_permission(&self) -> bool;

    fn notify(&self, title: &str, body: &str) -> AdapterResult<()>;
}

/// The single live adapter. Consumers hold it as `Arc<CapabilityAdapter>`.
pub struct CapabilityAdapter {
    pub profile: PlatformProfile,
    pub auth: Arc<dyn AuthCapability>,
    pub storage: Arc<dyn KeyValueStore>,
    pub navigation: Arc<dyn NavigationCapability>,
    pub notifications: Option<Arc<dyn NotificationCapability>>,
    pub user: CurrentUserContext,
}

impl std::fmt::Debug for CapabilityAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityAdapter")
            .field("profile", &self.profile)
            .field("notifications", &self.notifications.is_some())
            .finish_non_exhaustive()
    }
}
