//! In-memory host fakes for unit tests.

use crate::{
    AdapterResult, AuthMethod, CurrentUser, HistoryNavigator, HostProfile,
    MiniAppBridge, NativeOs, NativeShellBridge, NavigationCapability, NotificationCapability,
    SessionProvider,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use platform_storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

fn user(id: &str) -> CurrentUser {
    CurrentUser {
        id: id.to_string(),
        display_name: format!("User {}", id),
        email: None,
        avatar_url: None,
    }
}

#[derive(Default)]
pub struct FakeSessionProvider {
    signed_in: Mutex<Option<CurrentUser>>,
    sign_outs: AtomicUsize,
}

impl FakeSessionProvider {
    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for FakeSessionProvider {
    async fn sign_in(&self, _method: AuthMethod) -> AdapterResult<CurrentUser> {
        let u = user("web-1");
        *self.signed_in.lock() = Some(u.clone());
        Ok(u)
    }

    async fn sign_in_with_token(&self, session_token: &str) -> AdapterResult<CurrentUser> {
        let u = user(session_token);
        *self.signed_in.lock() = Some(u.clone());
        Ok(u)
    }

    async fn sign_out(&self) -> AdapterResult<()> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        *self.signed_in.lock() = None;
        Ok(())
    }

    fn current_user(&self) -> Option<CurrentUser> {
        self.signed_in.lock().clone()
    }
}

pub struct FakeMiniAppBridge {
    logged_in: AtomicBool,
    token: Option<String>,
    login_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

impl FakeMiniAppBridge {
    pub fn logged_out() -> Self {
        Self {
            logged_in: AtomicBool::new(false),
            token: None,
            login_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
        }
    }

    pub fn logged_in(token: &str) -> Self {
        Self {
            logged_in: AtomicBool::new(true),
            token: Some(token.to_string()),
            ..Self::logged_out()
        }
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MiniAppBridge for FakeMiniAppBridge {
    fn is_in_client(&self) -> bool {
        true
    }

    fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    fn get_id_token(&self) -> Option<String> {
        self.token.clone()
    }

    async fn get_profile(&self) -> AdapterResult<HostProfile> {
        Ok(HostProfile {
            user_id: "host-1".to_string(),
            display_name: "Host User".to_string(),
            picture_url: None,
            status_message: None,
        })
    }

    fn login(&self, _redirect_uri: Option<&str>) -> AdapterResult<()> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn logout(&self) {
        self.logged_in.store(false, Ordering::SeqCst);
    }

    fn close_window(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeNotifications;

#[async_trait]
impl NotificationCapability for FakeNotifications {
    async fn request_permission(&self) -> bool {
        true
    }

    fn notify(&self, _title: &str, _body: &str) -> AdapterResult<()> {
        Ok(())
    }
}

pub struct FakeNativeBridge {
    os: NativeOs,
    restored: Option<CurrentUser>,
    sign_ins: Mutex<Vec<AuthMethod>>,
    storage: Arc<MemoryStore>,
    navigation: Arc<HistoryNavigator>,
}

impl FakeNativeBridge {
    pub fn new(os: NativeOs) -> Self {
        Self {
            os,
            restored: None,
            sign_ins: Mutex::new(Vec::new()),
            storage: Arc::new(MemoryStore::new()),
            navigation: Arc::new(HistoryNavigator::new("/")),
        }
    }

    pub fn with_restored_user(mut self, id: &str) -> Self {
        self.restored = Some(user(id));
        self
    }

    pub fn sign_ins(&self) -> Vec<AuthMethod> {
        self.sign_ins.lock().clone()
    }
}

#[async_trait]
impl NativeShellBridge for FakeNativeBridge {
    fn os(&self) -> NativeOs {
        self.os
    }

    async fn sign_in(&self, method: AuthMethod) -> AdapterResult<CurrentUser> {
        self.sign_ins.lock().push(method);
        Ok(user("native-1"))
    }

    async fn sign_out(&self) -> AdapterResult<()> {
        Ok(())
    }

    fn current_user(&self) -> Option<CurrentUser> {
        self.restored.clone()
    }

    fn secure_storage(&self) -> Arc<dyn KeyValueStore> {
        self.storage.clone()
    }

    fn navigation(&self) -> Arc<dyn NavigationCapability> {
        self.navigation.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationCapability> {
        Arc::new(FakeNotifications)
    }
}

/// Storage the host refuses to let us use.
pub struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("storage disabled by host".to_string()))
    }

    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unavailable("storage disabled by host".to_string()))
    }

    fn remove(&self, _key: &str) -> StorageResult<bool> {
        Err(StorageError::Unavailable("storage disabled by host".to_string()))
    }
}
