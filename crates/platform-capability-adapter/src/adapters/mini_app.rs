//! Web view embedded in the messaging host.

use super::ensure_supported;
use crate::{
    AdapterResult, AuthCapability, AuthMethod, CapabilityAdapter, CurrentUser,
    CurrentUserContext, HistoryNavigator, HostEnvironment, LoginOutcome, MiniAppBridge,
    PlatformProfile, SessionProvider,
};
use async_trait::async_trait;
use platform_storage::FallbackStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Login hands control to the host; the callback screen runs the handshake.
pub struct MiniAppAuth {
    profile: PlatformProfile,
    bridge: Arc<dyn MiniAppBridge>,
    provider: Arc<dyn SessionProvider>,
    user: CurrentUserContext,
}

impl MiniAppAuth {
    pub fn new(
        profile: PlatformProfile,
        bridge: Arc<dyn MiniAppBridge>,
        provider: Arc<dyn SessionProvider>,
        user: CurrentUserContext,
    ) -> Self {
        Self {
            profile,
            bridge,
            provider,
            user,
        }
    }
}

#[async_trait]
impl AuthCapability for MiniAppAuth {
    async fn login(&self, method: AuthMethod) -> AdapterResult<LoginOutcome> {
        ensure_supported(&self.profile.auth_methods, self.profile.name, method)?;
        if !self.bridge.is_logged_in() {
            info!("Redirecting to host login");
            self.bridge.login(None)?;
        }
        Ok(LoginOutcome::Redirected)
    }

    async fn logout(&self) -> AdapterResult<()> {
        self.user.clear();
        if let Err(e) = self.provider.sign_out().await {
            warn!(error = %e, "Session provider sign-out failed");
        }
        self.bridge.logout();
        Ok(())
    }

    fn current_user(&self) -> Option<Arc<CurrentUser>> {
        self.user.get()
    }
}

pub(crate) fn build_mini_app_adapter(
    env: &HostEnvironment,
    bridge: Arc<dyn MiniAppBridge>,
    user: CurrentUserContext,
) -> CapabilityAdapter {
    let profile = PlatformProfile::mini_app();
    let auth = MiniAppAuth::new(
        profile.clone(),
        bridge.clone(),
        env.session_provider.clone(),
        user.clone(),
    );
    let storage = FallbackStore::new(env.local_storage.clone(), env.session_storage.clone());
    let navigation = HistoryNavigator::new("/").with_root_exit(move || bridge.close_window());

    CapabilityAdapter {
        profile,
        auth: Arc::new(auth),
        storage: Arc::new(storage),
        navigation: Arc::new(navigation),
        notifications: None,
        user,
    }
}
