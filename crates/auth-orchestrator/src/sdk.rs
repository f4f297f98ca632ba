//! Loader for the embedded host's SDK.

use crate::AuthResult;
use async_trait::async_trait;
use platform_capability_adapter::MiniAppBridge;
use std::sync::Arc;

/// Host SDK loader.
///
/// `loaded_bridge` returns the bridge when the host already injected it; the
/// handshake only calls `load` when it did not.
#[async_trait]
pub trait MiniAppSdk: Send + Sync {
    fn loaded_bridge(&self) -> Option<Arc<dyn MiniAppBridge>>;

    /// Load and initialise the SDK for `app_id`. Must be idempotent.
    async fn load(&self, app_id: Option<&str>) -> AuthResult<Arc<dyn MiniAppBridge>>;
}

/// An SDK that is always present, e.g. when the host injects its bridge
/// before the app starts.
pub struct PreloadedSdk {
    bridge: Arc<dyn MiniAppBridge>,
}

impl PreloadedSdk {
    pub fn new(bridge: Arc<dyn MiniAppBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl MiniAppSdk for PreloadedSdk {
    fn loaded_bridge(&self) -> Option<Arc<dyn MiniAppBridge>> {
        Some(self.bridge.clone())
    }

    async fn load(&self, _app_id: Option<&str>) -> AuthResult<Arc<dyn MiniAppBridge>> {
        Ok(self.bridge.clone())
    }
}
