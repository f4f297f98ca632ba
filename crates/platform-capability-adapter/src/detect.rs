//! Runtime detection and one-time adapter selection.

use crate::adapters::{
    build_mini_app_adapter, build_native_android_adapter, build_native_ios_adapter,
    build_web_adapter,
};
use crate::{
    AdapterError, AdapterResult, CapabilityAdapter, CurrentUserContext, HostEnvironment,
    NativeOs, PlatformName,
};
use std::sync::{Arc, OnceLock};
use tracing::info;

/// First match wins: embedded host bridge, then native shell bridge (by its
/// reported OS), then plain web. A standalone display is still web.
pub fn detect_platform(env: &HostEnvironment) -> PlatformName {
    if env.mini_app_bridge.is_some() {
        return PlatformName::EmbeddedMiniApp;
    }
    if let Some(native) = &env.native_bridge {
        return match native.os() {
            NativeOs::Ios => PlatformName::NativeIos,
            NativeOs::Android => PlatformName::NativeAndroid,
        };
    }
    PlatformName::GenericWeb
}

/// Build the adapter for the detected platform.
pub fn create_adapter(
    env: &HostEnvironment,
    user: CurrentUserContext,
) -> AdapterResult<CapabilityAdapter> {
    let platform = detect_platform(env);
    let adapter = match platform {
        PlatformName::EmbeddedMiniApp => {
            let bridge = env
                .mini_app_bridge
                .clone()
                .ok_or(AdapterError::MissingBridge("mini-app"))?;
            build_mini_app_adapter(env, bridge, user)
        }
        PlatformName::NativeIos | PlatformName::NativeAndroid => {
            let bridge = env
                .native_bridge
                .clone()
                .ok_or(AdapterError::MissingBridge("native shell"))?;
            if platform == PlatformName::NativeIos {
                build_native_ios_adapter(bridge, user)
            } else {
                build_native_android_adapter(bridge, user)
            }
        }
        PlatformName::GenericWeb => build_web_adapter(env, user),
    };

    info!(
        platform = %adapter.profile.name,
        installable = adapter.profile.installable,
        storage = ?adapter.profile.storage_class,
        "Capability adapter selected"
    );
    Ok(adapter)
}

/// Holds the one live adapter for the process.
///
/// The first successful `select` wins; every later call returns the same
/// instance without re-running detection.
#[derive(Default)]
pub struct AdapterSlot {
    cell: OnceLock<Arc<CapabilityAdapter>>,
}

impl AdapterSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(
        &self,
        env: &HostEnvironment,
        user: CurrentUserContext,
    ) -> AdapterResult<Arc<CapabilityAdapter>> {
        if let Some(existing) = self.cell.get() {
            return Ok(existing.clone());
        }
        let adapter = Arc::new(create_adapter(env, user)?);
        Ok(self.cell.get_or_init(|| adapter).clone())
    }

    pub fn get(&self) -> Option<Arc<CapabilityAdapter>> {
        self.cell.get().cloned()
    }
}
