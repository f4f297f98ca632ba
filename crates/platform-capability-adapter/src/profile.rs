//! Immutable description of the detected runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformName {
    GenericWeb,
    EmbeddedMiniApp,
    NativeIos,
    NativeAndroid,
}

impl PlatformName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformName::GenericWeb => "generic-web",
            PlatformName::EmbeddedMiniApp => "embedded-mini-app",
            PlatformName::NativeIos => "native-ios",
            PlatformName::NativeAndroid => "native-android",
        }
    }
}

impl fmt::Display for PlatformName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMethod {
    Email,
    Google,
    /// Device-vendor single sign-on, only on Apple devices.
    Apple,
    /// The embedded host's own login.
    MiniAppHost,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthMethod::Email => "email",
            AuthMethod::Google => "google",
            AuthMethod::Apple => "apple",
            AuthMethod::MiniAppHost => "mini-app-host",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageClass {
    BrowserLocal,
    NativeSecure,
    /// Cleared when the host container closes.
    SessionScopedLimited,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub name: PlatformName,
    pub supports_notifications: bool,
    pub supports_offline: bool,
    pub auth_methods: BTreeSet<AuthMethod>,
    pub storage_class: StorageClass,
    /// Running as an installed standalone web app.
    pub installable: bool,
}

impl PlatformProfile {
    pub fn web(installable: bool, supports_notifications: bool) -> Self {
        Self {
            name: PlatformName::GenericWeb,
            supports_notifications,
            supports_offline: installable,
            auth_methods: [AuthMethod::Email, AuthMethod::Google].into(),
            storage_class: StorageClass::BrowserLocal,
            installable,
        }
    }

    pub fn mini_app() -> Self {
        Self {
            name: PlatformName::EmbeddedMiniApp,
            supports_notifications: false,
            supports_offline: false,
            auth_methods: [AuthMethod::MiniAppHost].into(),
            storage_class: StorageClass::SessionScopedLimited,
            installable: false,
        }
    }

    pub fn native_ios() -> Self {
        Self {
            name: PlatformName::NativeIos,
            supports_notifications: true,
            supports_offline: true,
            auth_methods: [AuthMethod::Email, AuthMethod::Google, AuthMethod::Apple].into(),
            storage_class: StorageClass::NativeSecure,
            installable: false,
        }
    }

    /// The iOS profile without device-vendor sign-on.
    pub fn native_android() -> Self {
        let mut profile = Self::native_ios();
        profile.name = PlatformName::NativeAndroid;
        profile.auth_methods.remove(&AuthMethod::Apple);
        profile
    }

    pub fn supports(&self, method: AuthMethod) -> bool {
        self.auth_methods.contains(&method)
    }
}
