//! Host-provided collaborators.
//!
//! These traits are how the runtime's injected objects reach Rust: the
//! embedded host's bridge, the native shell's bridge, and the identity
//! provider that owns the application session.

use crate::{AdapterResult, AuthMethod, CurrentUser, NavigationCapability, NotificationCapability};
use async_trait::async_trait;
use health_monitor::{ConnectivitySignal, StaticConnectivity};
use platform_storage::{KeyValueStore, MemoryStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Profile the embedded host reports for its signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

/// Bridge object injected by the embedded mini-app host.
#[async_trait]
pub trait MiniAppBridge: Send + Sync {
    /// Whether the page runs inside the host's in-app browser.
    fn is_in_client(&self) -> bool;

    fn is_logged_in(&self) -> bool;

    /// Identity assertion for the signed-in host user.
    fn get_id_token(&self) -> Option<String>;

    async fn get_profile(&self) -> AdapterResult<HostProfile>;

    /// Start the host's login flow, returning to `redirect_uri` afterwards.
    fn login(&self, redirect_uri: Option<&str>) -> AdapterResult<()>;

    fn logout(&self);

    /// Close the host's web view.
    fn close_window(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeOs {
    Ios,
    Android,
}

/// Bridge object injected by a native mobile shell.
#[async_trait]
pub trait NativeShellBridge: Send + Sync {
    fn os(&self) -> NativeOs;

    async fn sign_in(&self, method: AuthMethod) -> AdapterResult<CurrentUser>;

    async fn sign_out(&self) -> AdapterResult<()>;

    fn current_user(&self) -> Option<CurrentUser>;

    fn secure_storage(&self) -> Arc<dyn KeyValueStore>;

    fn navigation(&self) -> Arc<dyn NavigationCapability>;

    fn notifications(&self) -> Arc<dyn NotificationCapability>;
}

/// Identity provider holding the application session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Interactive sign-in with one of the provider's own methods.
    async fn sign_in(&self, method: AuthMethod) -> AdapterResult<CurrentUser>;

    /// Sign in with a session token minted by the identity service.
    async fn sign_in_with_token(&self, session_token: &str) -> AdapterResult<CurrentUser>;

    async fn sign_out(&self) -> AdapterResult<()>;

    fn current_user(&self) -> Option<CurrentUser>;
}

/// Everything the runtime injected at startup.
#[derive(Clone)]
pub struct HostEnvironment {
    pub mini_app_bridge: Option<Arc<dyn MiniAppBridge>>,
    pub native_bridge: Option<Arc<dyn NativeShellBridge>>,
    /// The page is running as an installed standalone app.
    pub standalone_display: bool,
    pub local_storage: Arc<dyn KeyValueStore>,
    /// Cleared when the host container closes.
    pub session_storage: Arc<dyn KeyValueStore>,
    pub session_provider: Arc<dyn SessionProvider>,
    pub notifications: Option<Arc<dyn NotificationCapability>>,
    pub connectivity: Arc<dyn ConnectivitySignal>,
}

impl HostEnvironment {
    /// A plain browser with in-memory stores and no bridges.
    pub fn new(session_provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            mini_app_bridge: None,
            native_bridge: None,
            standalone_display: false,
            local_storage: Arc::new(MemoryStore::new()),
            session_storage: Arc::new(MemoryStore::new()),
            session_provider,
            notifications: None,
            connectivity: Arc::new(StaticConnectivity::default()),
        }
    }

    pub fn with_mini_app_bridge(mut self, bridge: Arc<dyn MiniAppBridge>) -> Self {
        self.mini_app_bridge = Some(bridge);
        self
    }

    pub fn with_native_bridge(mut self, bridge: Arc<dyn NativeShellBridge>) -> Self {
        self.native_bridge = Some(bridge);
        self
    }

    pub fn with_standalone_display(mut self, standalone: bool) -> Self {
        self.standalone_display = standalone;
        self
    }

    pub fn with_local_storage(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.local_storage = store;
        self
    }

    pub fn with_session_storage(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.session_storage = store;
        self
    }

    pub fn with_notifications(mut self, notifications: Arc<dyn NotificationCapability>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn with_connectivity(mut self, connectivity: Arc<dyn ConnectivitySignal>) -> Self {
        self.connectivity = connectivity;
        self
    }
}
