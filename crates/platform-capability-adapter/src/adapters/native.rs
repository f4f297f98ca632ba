//! Native mobile shells.
//!
//! Android reuses the iOS adapter and only narrows its auth methods through
//! [`RestrictedAuth`].

use super::ensure_supported;
use crate::{
    AdapterResult, AuthCapability, AuthMethod, CapabilityAdapter, CurrentUser,
    CurrentUserContext, LoginOutcome, NativeShellBridge, PlatformName, PlatformProfile,
};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Sign-in through the native shell.
pub struct NativeAuth {
    profile: PlatformProfile,
    bridge: Arc<dyn NativeShellBridge>,
    user: CurrentUserContext,
}

impl NativeAuth {
    pub fn new(
        profile: PlatformProfile,
        bridge: Arc<dyn NativeShellBridge>,
        user: CurrentUserContext,
    ) -> Self {
        Self {
            profile,
            bridge,
            user,
        }
    }
}

#[async_trait]
impl AuthCapability for NativeAuth {
    async fn login(&self, method: AuthMethod) -> AdapterResult<LoginOutcome> {
        ensure_supported(&self.profile.auth_methods, self.profile.name, method)?;
        let user = self.bridge.sign_in(method).await?;
        info!(user_id = %user.id, %method, "Signed in through native shell");
        Ok(LoginOutcome::SignedIn(self.user.set(user)))
    }

    async fn logout(&self) -> AdapterResult<()> {
        let result = self.bridge.sign_out().await;
        self.user.clear();
        result
    }

    fn current_user(&self) -> Option<Arc<CurrentUser>> {
        self.user.get().or_else(|| {
            // The shell may restore a session across launches.
            self.bridge.current_user().map(|u| self.user.set(u))
        })
    }
}

/// Delegates to another auth capability with a narrower method set.
pub struct RestrictedAuth {
    inner: Arc<dyn AuthCapability>,
    allowed: BTreeSet<AuthMethod>,
    platform: PlatformName,
}

impl RestrictedAuth {
    pub fn new(
        inner: Arc<dyn AuthCapability>,
        allowed: BTreeSet<AuthMethod>,
        platform: PlatformName,
    ) -> Self {
        Self {
            inner,
            allowed,
            platform,
        }
    }
}

#[async_trait]
impl AuthCapability for RestrictedAuth {
    async fn login(&self, method: AuthMethod) -> AdapterResult<LoginOutcome> {
        ensure_supported(&self.allowed, self.platform, method)?;
        self.inner.login(method).await
    }

    async fn logout(&self) -> AdapterResult<()> {
        self.inner.logout().await
    }

    fn current_user(&self) -> Option<Arc<CurrentUser>> {
        self.inner.current_user()
    }
}

pub(crate) fn build_native_ios_adapter(
    bridge: Arc<dyn NativeShellBridge>,
    user: CurrentUserContext,
) -> CapabilityAdapter {
    let profile = PlatformProfile::native_ios();
    let auth = NativeAuth::new(profile.clone(), bridge.clone(), user.clone());

    CapabilityAdapter {
        profile,
        auth: Arc::new(auth),
        storage: bridge.secure_storage(),
        navigation: bridge.navigation(),
        notifications: Some(bridge.notifications()),
        user,
    }
}

pub(crate) fn build_native_android_adapter(
    bridge: Arc<dyn NativeShellBridge>,
    user: CurrentUserContext,
) -> CapabilityAdapter {
    let ios = build_native_ios_adapter(bridge, user);
    let profile = PlatformProfile::native_android();
    let auth = RestrictedAuth::new(ios.auth, profile.auth_methods.clone(), profile.name);

    CapabilityAdapter {
        profile,
        auth: Arc::new(auth),
        ..ios
    }
}
