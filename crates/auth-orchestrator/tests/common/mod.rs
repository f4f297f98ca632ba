//! Test harness: in-memory host, identity service and session provider.

#![allow(dead_code)]

use async_trait::async_trait;
use auth_orchestrator::{
    AuthError, AuthResult, ExchangeRequest, ExchangeResponse, HandshakeBreakers, IdentityExchange,
    MiniAppSdk, Orchestrator, OrchestratorConfig,
};
use parking_lot::Mutex;
use platform_capability_adapter::{
    AdapterError, AdapterResult, AuthMethod, CapabilityAdapter, CurrentUser, CurrentUserContext,
    HostProfile, MiniAppAuth, MiniAppBridge, NavigationCapability, PlatformProfile,
    SessionProvider,
};
use platform_storage::{MemoryStore, SessionStore};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub fn somchai() -> CurrentUser {
    CurrentUser {
        id: "u1".to_string(),
        display_name: "Somchai".to_string(),
        email: None,
        avatar_url: None,
    }
}

// ==========================================
// Host bridge and SDK
// ==========================================

pub struct MockBridge {
    logged_in: AtomicBool,
    token: Option<String>,
    profile_fails: bool,
    login_calls: AtomicUsize,
    logout_calls: AtomicUsize,
}

impl MockBridge {
    pub fn logged_in(token: &str) -> Self {
        Self {
            logged_in: AtomicBool::new(true),
            token: Some(token.to_string()),
            profile_fails: false,
            login_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
        }
    }

    pub fn logged_out() -> Self {
        Self {
            logged_in: AtomicBool::new(false),
            token: None,
            ..Self::logged_in("")
        }
    }

    /// Signed in on the host but the host hands out no token.
    pub fn without_token() -> Self {
        Self {
            token: None,
            ..Self::logged_in("")
        }
    }

    pub fn with_failing_profile(mut self) -> Self {
        self.profile_fails = true;
        self
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MiniAppBridge for MockBridge {
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
        if self.profile_fails {
            return Err(AdapterError::Bridge("profile scope not granted".to_string()));
        }
        Ok(HostProfile {
            user_id: "U123".to_string(),
            display_name: "Somchai".to_string(),
            picture_url: Some("https://host.example/somchai.png".to_string()),
            status_message: None,
        })
    }

    fn login(&self, _redirect_uri: Option<&str>) -> AdapterResult<()> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn logout(&self) {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.logged_in.store(false, Ordering::SeqCst);
    }

    fn close_window(&self) {}
}

/// SDK that has to be loaded before the bridge exists.
pub struct MockSdk {
    bridge: Arc<MockBridge>,
    loaded: Mutex<Option<Arc<dyn MiniAppBridge>>>,
    loads: AtomicUsize,
    fail_loads: AtomicBool,
}

impl MockSdk {
    pub fn new(bridge: Arc<MockBridge>) -> Self {
        Self {
            bridge,
            loaded: Mutex::new(None),
            loads: AtomicUsize::new(0),
            fail_loads: AtomicBool::new(false),
        }
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MiniAppSdk for MockSdk {
    fn loaded_bridge(&self) -> Option<Arc<dyn MiniAppBridge>> {
        self.loaded.lock().clone()
    }

    async fn load(&self, _app_id: Option<&str>) -> AuthResult<Arc<dyn MiniAppBridge>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(AuthError::SdkLoad("script blocked".to_string()));
        }
        let mut loaded = self.loaded.lock();
        let bridge = loaded
            .get_or_insert_with(|| self.bridge.clone() as Arc<dyn MiniAppBridge>)
            .clone();
        Ok(bridge)
    }
}

// ==========================================
// Identity service
// ==========================================

#[derive(Debug, Clone)]
pub enum ExchangeReply {
    Session(String),
    Timeout,
    Reject {
        status: u16,
        code: Option<String>,
        message: String,
    },
    /// Answer with a session after a delay.
    Slow(Duration, String),
}

pub struct MockIdentityService {
    replies: Mutex<VecDeque<ExchangeReply>>,
    fallback: ExchangeReply,
    requests: Mutex<Vec<(Instant, ExchangeRequest)>>,
}

impl MockIdentityService {
    /// Every call gets `reply`.
    pub fn always(reply: ExchangeReply) -> Self {
        Self::scripted(Vec::new(), reply)
    }

    /// Calls get `replies` in order, then `fallback`.
    pub fn scripted(replies: Vec<ExchangeReply>, fallback: ExchangeReply) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<ExchangeRequest> {
        self.requests.lock().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.requests.lock().iter().map(|(at, _)| *at).collect()
    }
}

#[async_trait]
impl IdentityExchange for MockIdentityService {
    async fn exchange(&self, request: &ExchangeRequest) -> AuthResult<ExchangeResponse> {
        self.requests.lock().push((Instant::now(), request.clone()));
        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            ExchangeReply::Session(token) => Ok(ExchangeResponse {
                session_token: token,
                user: somchai(),
            }),
            ExchangeReply::Timeout => Err(AuthError::Timeout),
            ExchangeReply::Reject {
                status,
                code,
                message,
            } => Err(AuthError::AuthExchange {
                status: Some(status),
                code,
                message,
            }),
            ExchangeReply::Slow(delay, token) => {
                tokio::time::sleep(delay).await;
                Ok(ExchangeResponse {
                    session_token: token,
                    user: somchai(),
                })
            }
        }
    }
}

// ==========================================
// Session provider
// ==========================================

#[derive(Default)]
pub struct MockProvider {
    tokens: Mutex<Vec<String>>,
    signed_in: Mutex<Option<CurrentUser>>,
    sign_outs: AtomicUsize,
}

impl MockProvider {
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().clone()
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for MockProvider {
    async fn sign_in(&self, method: AuthMethod) -> AdapterResult<CurrentUser> {
        Err(AdapterError::Provider(format!("{} sign-in not available", method)))
    }

    async fn sign_in_with_token(&self, session_token: &str) -> AdapterResult<CurrentUser> {
        self.tokens.lock().push(session_token.to_string());
        let user = somchai();
        *self.signed_in.lock() = Some(user.clone());
        Ok(user)
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

// ==========================================
// Navigation
// ==========================================

/// Records every route change and whether a user was already published.
pub struct RecordingNavigator {
    user: CurrentUserContext,
    route: Mutex<String>,
    replaces: Mutex<Vec<(String, bool)>>,
}

impl RecordingNavigator {
    pub fn new(user: CurrentUserContext) -> Self {
        Self {
            user,
            route: Mutex::new("/auth/callback".to_string()),
            replaces: Mutex::new(Vec::new()),
        }
    }

    /// `(route, user_was_set)` for each `replace`.
    pub fn replaces(&self) -> Vec<(String, bool)> {
        self.replaces.lock().clone()
    }
}

impl NavigationCapability for RecordingNavigator {
    fn navigate(&self, path: &str) {
        *self.route.lock() = path.to_string();
    }

    fn go_back(&self) {}

    fn replace(&self, path: &str) {
        self.replaces
            .lock()
            .push((path.to_string(), self.user.is_signed_in()));
        *self.route.lock() = path.to_string();
    }

    fn current_route(&self) -> String {
        self.route.lock().clone()
    }
}

// ==========================================
// Harness
// ==========================================

pub struct Harness {
    pub bridge: Arc<MockBridge>,
    pub sdk: Arc<MockSdk>,
    pub identity: Arc<MockIdentityService>,
    pub provider: Arc<MockProvider>,
    pub navigator: Arc<RecordingNavigator>,
    pub user: CurrentUserContext,
    pub storage: Arc<MemoryStore>,
    pub adapter: Arc<CapabilityAdapter>,
    pub breakers: HandshakeBreakers,
}

impl Harness {
    pub fn new(bridge: MockBridge, identity: MockIdentityService) -> Self {
        let bridge = Arc::new(bridge);
        let sdk = Arc::new(MockSdk::new(bridge.clone()));
        let identity = Arc::new(identity);
        let provider = Arc::new(MockProvider::default());
        let user = CurrentUserContext::new();
        let navigator = Arc::new(RecordingNavigator::new(user.clone()));
        let storage = Arc::new(MemoryStore::new());

        let profile = PlatformProfile::mini_app();
        let auth = MiniAppAuth::new(
            profile.clone(),
            bridge.clone(),
            provider.clone(),
            user.clone(),
        );
        let adapter = Arc::new(CapabilityAdapter {
            profile,
            auth: Arc::new(auth),
            storage: storage.clone(),
            navigation: navigator.clone(),
            notifications: None,
            user: user.clone(),
        });

        Self {
            bridge,
            sdk,
            identity,
            provider,
            navigator,
            user,
            storage,
            adapter,
            breakers: HandshakeBreakers::default(),
        }
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            OrchestratorConfig::default(),
            self.adapter.clone(),
            self.provider.clone(),
            self.sdk.clone(),
            self.identity.clone(),
            self.breakers.clone(),
        )
    }

    pub fn sessions(&self) -> SessionStore {
        SessionStore::new(self.storage.clone())
    }
}
