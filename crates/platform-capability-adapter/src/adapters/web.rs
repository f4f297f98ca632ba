//! Generic browser.

use super::ensure_supported;
use crate::{
    AdapterResult, AuthCapability, AuthMethod, CapabilityAdapter, CurrentUser,
    CurrentUserContext, HistoryNavigator, HostEnvironment, LoginOutcome, PlatformProfile,
    SessionProvider,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Sign-in through the identity provider's own methods.
pub struct WebAuth {
    profile: PlatformProfile,
    provider: Arc<dyn SessionProvider>,
    user: CurrentUserContext,
}

impl WebAuth {
    pub fn new(
        profile: PlatformProfile,
        provider: Arc<dyn SessionProvider>,
        user: CurrentUserContext,
    ) -> Self {
        Self {
            profile,
            provider,
            user,
        }
    }
}

#[async_trait]
impl AuthCapability for WebAuth {
    async fn login(&self, method: AuthMethod) -> AdapterResult<LoginOutcome> {
        ensure_supported(&self.profile.auth_methods, self.profile.name, method)?;
        let user = self.provider.sign_in(method).await?;
        info!(user_id = %user.id, %method, "Signed in");
        Ok(LoginOutcome::SignedIn(self.user.set(user)))
    }

    async fn logout(&self) -> AdapterResult<()> {
        let result = self.provider.sign_out().await;
        self.user.clear();
        result
    }

    fn current_user(&self) -> Option<Arc<CurrentUser>> {
        self.user.get()
    }
}

pub(crate) fn build_web_adapter(env: &HostEnvironment, user: CurrentUserContext) -> CapabilityAdapter {
    let profile = PlatformProfile::web(env.standalone_display, env.notifications.is_some());
    let auth = WebAuth::new(profile.clone(), env.session_provider.clone(), user.clone());

    CapabilityAdapter {
        profile,
        auth: Arc::new(auth),
        storage: env.local_storage.clone(),
        navigation: Arc::new(HistoryNavigator::new("/")),
        notifications: env.notifications.clone(),
        user,
    }
}
