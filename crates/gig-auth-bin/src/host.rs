//! Stand-in host bridges for driving detection and the handshake from the CLI.

use async_trait::async_trait;
use platform_capability_adapter::{
    AdapterError, AdapterResult, AuthMethod, CurrentUser, HistoryNavigator, HostEnvironment,
    HostProfile, MiniAppBridge, NativeOs, NativeShellBridge, NavigationCapability,
    NotificationCapability, SessionProvider,
};
use parking_lot::Mutex;
use platform_storage::{KeyValueStore, MemoryStore};
use std::sync::Arc;
use tracing::info;

use crate::HostKind;

/// Provider that has no backing identity service.
pub struct OfflineSessionProvider;

#[async_trait]
impl SessionProvider for OfflineSessionProvider {
    async fn sign_in(&self, method: AuthMethod) -> AdapterResult<CurrentUser> {
        Err(AdapterError::Provider(format!(
            "{} sign-in is not available from the CLI",
            method
        )))
    }

    async fn sign_in_with_token(&self, _session_token: &str) -> AdapterResult<CurrentUser> {
        Err(AdapterError::Provider(
            "Token sign-in is not available from the CLI".to_string(),
        ))
    }

    async fn sign_out(&self) -> AdapterResult<()> {
        Ok(())
    }

    fn current_user(&self) -> Option<CurrentUser> {
        None
    }
}

/// Application identity provider for the CLI.
///
/// Accepts whatever session token the identity service issues and signs in
/// a local user under the given display name.
pub struct LocalSessionProvider {
    display_name: String,
    user: Mutex<Option<CurrentUser>>,
}

impl LocalSessionProvider {
    pub const USER_ID: &'static str = "local-user";

    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            user: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SessionProvider for LocalSessionProvider {
    async fn sign_in(&self, method: AuthMethod) -> AdapterResult<CurrentUser> {
        Err(AdapterError::Provider(format!(
            "{} sign-in is not available from the CLI",
            method
        )))
    }

    async fn sign_in_with_token(&self, session_token: &str) -> AdapterResult<CurrentUser> {
        if session_token.is_empty() {
            return Err(AdapterError::Provider("Empty session token".to_string()));
        }
        let user = CurrentUser {
            id: Self::USER_ID.to_string(),
            display_name: self.display_name.clone(),
            email: None,
            avatar_url: None,
        };
        *self.user.lock() = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> AdapterResult<()> {
        self.user.lock().take();
        Ok(())
    }

    fn current_user(&self) -> Option<CurrentUser> {
        self.user.lock().clone()
    }
}

/// An embedded host. Its user is signed in only when given an identity token.
pub struct SimulatedMiniAppHost {
    id_token: Option<String>,
    display_name: String,
}

impl SimulatedMiniAppHost {
    pub fn signed_out() -> Self {
        Self {
            id_token: None,
            display_name: String::new(),
        }
    }

    pub fn signed_in(id_token: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id_token: Some(id_token.into()),
            display_name: display_name.into(),
        }
    }
}

#[async_trait]
impl MiniAppBridge for SimulatedMiniAppHost {
    fn is_in_client(&self) -> bool {
        true
    }

    fn is_logged_in(&self) -> bool {
        self.id_token.is_some()
    }

    fn get_id_token(&self) -> Option<String> {
        self.id_token.clone()
    }

    async fn get_profile(&self) -> AdapterResult<HostProfile> {
        if self.id_token.is_none() {
            return Err(AdapterError::Bridge("Simulated host has no profile".to_string()));
        }
        Ok(HostProfile {
            user_id: "cli-host-user".to_string(),
            display_name: self.display_name.clone(),
            picture_url: None,
            status_message: None,
        })
    }

    fn login(&self, _redirect_uri: Option<&str>) -> AdapterResult<()> {
        info!("Host login requested; sign in with --id-token to continue");
        Ok(())
    }

    fn logout(&self) {}

    fn close_window(&self) {}
}

struct NoNotifications;

#[async_trait]
impl NotificationCapability for NoNotifications {
    async fn request_permission(&self) -> bool {
        false
    }

    fn notify(&self, _title: &str, _body: &str) -> AdapterResult<()> {
        Err(AdapterError::Notifications(
            "Simulated shell has no notification center".to_string(),
        ))
    }
}

/// A native shell with in-memory secure storage.
pub struct SimulatedNativeShell {
    os: NativeOs,
    storage: Arc<MemoryStore>,
    navigation: Arc<HistoryNavigator>,
}

impl SimulatedNativeShell {
    pub fn new(os: NativeOs) -> Self {
        Self {
            os,
            storage: Arc::new(MemoryStore::new()),
            navigation: Arc::new(HistoryNavigator::new("/")),
        }
    }
}

#[async_trait]
impl NativeShellBridge for SimulatedNativeShell {
    fn os(&self) -> NativeOs {
        self.os
    }

    async fn sign_in(&self, method: AuthMethod) -> AdapterResult<CurrentUser> {
        Err(AdapterError::Provider(format!(
            "{} sign-in is not available from the CLI",
            method
        )))
    }

    async fn sign_out(&self) -> AdapterResult<()> {
        Ok(())
    }

    fn current_user(&self) -> Option<CurrentUser> {
        None
    }

    fn secure_storage(&self) -> Arc<dyn KeyValueStore> {
        self.storage.clone()
    }

    fn navigation(&self) -> Arc<dyn NavigationCapability> {
        self.navigation.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationCapability> {
        Arc::new(NoNotifications)
    }
}

/// Host environment as the given runtime would inject it.
pub fn simulated_environment(kind: HostKind, standalone: bool) -> HostEnvironment {
    let env = HostEnvironment::new(Arc::new(OfflineSessionProvider))
        .with_standalone_display(standalone);
    match kind {
        HostKind::Web => env,
        HostKind::MiniApp => env.with_mini_app_bridge(Arc::new(SimulatedMiniAppHost::signed_out())),
        HostKind::Ios => env.with_native_bridge(Arc::new(SimulatedNativeShell::new(NativeOs::Ios))),
        HostKind::Android => {
            env.with_native_bridge(Arc::new(SimulatedNativeShell::new(NativeOs::Android)))
        }
    }
}
