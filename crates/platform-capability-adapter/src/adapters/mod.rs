//! Concrete adapters, one per host.

mod mini_app;
mod native;
mod web;

pub use mini_app::MiniAppAuth;
pub use native::{NativeAuth, RestrictedAuth};
pub use web::WebAuth;

pub(crate) use mini_app::build_mini_app_adapter;
pub(crate) use native::{build_native_android_adapter, build_native_ios_adapter};
pub(crate) use web::build_web_adapter;

use crate::{AdapterError, AdapterResult, AuthMethod, PlatformName};
use std::collections::BTreeSet;

fn ensure_supported(
    methods: &BTreeSet<AuthMethod>,
    platform: PlatformName,
    method: AuthMethod,
) -> AdapterResult<()> {
    if methods.contains(&method) {
        Ok(())
    } else {
        Err(AdapterError::UnsupportedMethod { method, platform })
    }
}
