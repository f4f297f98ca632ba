//! The embedded mini-app handshake driver.
//!
//! One `run` walks the handshake machine from `Start` to a terminal step:
//! load the host SDK, check the host login, read the identity token and
//! profile, exchange the token with the identity service, open the
//! application session, then publish the user and move to the post-login
//! route. Every error is handed back to the caller so an error boundary can
//! decide whether to re-run the whole handshake.

use crate::exchange::{ExchangeRequest, IdentityExchange};
use crate::handshake_fsm::{HandshakeInput, HandshakeMachine, HandshakeStep};
use crate::sdk::MiniAppSdk;
use crate::{AuthError, AuthResult};
use chrono::Utc;
use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use gig_auth_config::{Config, UserRole};
use health_monitor::HealthMonitor;
use parking_lot::Mutex;
use platform_capability_adapter::{
    CapabilityAdapter, CurrentUser, HostProfile, MiniAppBridge, SessionProvider,
};
use platform_storage::{SessionStore, StorageResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::form_urlencoded;
use uuid::Uuid;

/// Breaker name for calls into the host SDK.
pub const HOST_SDK_BREAKER: &str = "host-sdk";

/// Breaker name for the identity service exchange.
pub const IDENTITY_EXCHANGE_BREAKER: &str = "identity-exchange";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub role: UserRole,
    /// Host app identifier passed to the SDK loader.
    pub app_id: Option<String>,
    pub post_login_route: String,
    pub landing_route: String,
    /// Start the host login when the host user is signed out.
    pub login_when_logged_out: bool,
}

impl OrchestratorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            role: config.role,
            app_id: config.mini_app_id().map(str::to_string),
            post_login_route: config.post_login_route().to_string(),
            landing_route: config.landing_route.clone(),
            login_when_logged_out: true,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The two breakers the handshake calls through. Shared process-wide.
#[derive(Clone)]
pub struct HandshakeBreakers {
    pub host_sdk: Arc<CircuitBreaker>,
    pub identity_exchange: Arc<CircuitBreaker>,
}

impl Default for HandshakeBreakers {
    fn default() -> Self {
        Self {
            host_sdk: Arc::new(CircuitBreaker::new(
                HOST_SDK_BREAKER,
                CircuitBreakerConfig::host_sdk(),
            )),
            identity_exchange: Arc::new(CircuitBreaker::new(
                IDENTITY_EXCHANGE_BREAKER,
                CircuitBreakerConfig::identity_exchange(),
            )),
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(Arc<CurrentUser>),
    /// The host user is signed out; nothing was sent to the backend.
    NotLoggedIn,
}

pub struct Orchestrator {
    config: OrchestratorConfig,
    adapter: Arc<CapabilityAdapter>,
    provider: Arc<dyn SessionProvider>,
    sdk: Arc<dyn MiniAppSdk>,
    exchange: Arc<dyn IdentityExchange>,
    sessions: SessionStore,
    breakers: HandshakeBreakers,
    health: Option<Arc<HealthMonitor>>,
    fsm: Mutex<HandshakeMachine>,
    step_tx: watch::Sender<HandshakeStep>,
    running: AtomicBool,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        adapter: Arc<CapabilityAdapter>,
        provider: Arc<dyn SessionProvider>,
        sdk: Arc<dyn MiniAppSdk>,
        exchange: Arc<dyn IdentityExchange>,
        breakers: HandshakeBreakers,
    ) -> Self {
        let sessions = SessionStore::new(adapter.storage.clone());
        let (step_tx, _) = watch::channel(HandshakeStep::Start);
        Self {
            config,
            adapter,
            provider,
            sdk,
            exchange,
            sessions,
            breakers,
            health: None,
            fsm: Mutex::new(HandshakeMachine::new()),
            step_tx,
            running: AtomicBool::new(false),
        }
    }

    /// Refuse to start while the monitor's latest snapshot is unhealthy.
    pub fn with_health(mut self, health: Arc<HealthMonitor>) -> Self {
        self.health = Some(health);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn breakers(&self) -> &HandshakeBreakers {
        &self.breakers
    }

    pub fn step(&self) -> HandshakeStep {
        HandshakeStep::from(self.fsm.lock().state())
    }

    /// Watch step changes, e.g. for a progress indicator.
    pub fn subscribe(&self) -> watch::Receiver<HandshakeStep> {
        self.step_tx.subscribe()
    }

    /// Run the handshake once from the start.
    pub async fn run(&self) -> AuthResult<RunOutcome> {
        let _guard = RunGuard::acquire(&self.running)?;
        self.reset();
        info!(role = self.config.role.as_str(), "Starting auth handshake");

        if let Some(health) = &self.health {
            let snapshot = health.overall_health();
            if !snapshot.permits_auth() {
                let failing: Vec<&str> = snapshot
                    .checks
                    .iter()
                    .filter(|c| c.status == snapshot.status)
                    .map(|c| c.service.as_str())
                    .collect();
                return Err(self.fail(AuthError::HealthGate(format!(
                    "{} ({})",
                    snapshot.status.as_str(),
                    failing.join(", ")
                ))));
            }
        }

        match self.handshake().await {
            Ok(outcome) => Ok(outcome),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Sign out everywhere and return to the landing route.
    pub async fn logout(&self) -> AuthResult<()> {
        self.adapter.user.clear();
        if let Err(e) = self.sessions.clear_session() {
            warn!(error = %e, "Failed to clear session bookkeeping");
        }
        self.provider.sign_out().await?;
        if let Some(bridge) = self.sdk.loaded_bridge() {
            if bridge.is_logged_in() {
                bridge.logout();
            }
        }
        self.reset();
        self.adapter.navigation.replace(&self.config.landing_route);
        info!("Signed out");
        Ok(())
    }

    async fn handshake(&self) -> AuthResult<RunOutcome> {
        self.transition(&HandshakeInput::SdkLoad)?;
        let bridge = self.load_sdk().await?;
        self.transition(&HandshakeInput::SdkLoaded)?;

        self.transition(&HandshakeInput::CheckLogin)?;
        if !bridge.is_logged_in() {
            self.transition(&HandshakeInput::LoggedOut)?;
            return self.handle_logged_out(&bridge).await;
        }
        self.transition(&HandshakeInput::LoggedIn)?;

        let token = bridge
            .get_id_token()
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::TokenUnavailable)?;
        self.audit("id_token", |s| s.record_id_token(&token));
        self.transition(&HandshakeInput::TokenRetrieved)?;

        let profile = self.fetch_profile(&bridge).await;
        self.transition(&HandshakeInput::ProfileDone)?;

        let request = ExchangeRequest {
            identity_assertion: token,
            profile,
            requested_role: self.config.role,
        };
        let response = self
            .breakers
            .identity_exchange
            .execute(|| self.exchange.exchange(&request))
            .await?;
        self.transition(&HandshakeInput::Exchanged)?;

        let user = self
            .provider
            .sign_in_with_token(&response.session_token)
            .await
            .map_err(|e| AuthError::NativeSession(e.to_string()))?;
        let session_id = Uuid::new_v4().to_string();
        self.audit("session", |s| s.start_session(&session_id, &user.id));
        self.transition(&HandshakeInput::SessionEstablished)?;

        // Consumers of the post-login route read the user on first render.
        let user = self.adapter.user.set(user);
        self.adapter
            .navigation
            .replace(&self.config.post_login_route);
        self.transition(&HandshakeInput::Propagated)?;

        info!(user_id = %user.id, "Auth handshake complete");
        Ok(RunOutcome::Completed(user))
    }

    async fn load_sdk(&self) -> AuthResult<Arc<dyn MiniAppBridge>> {
        if let Some(bridge) = self.sdk.loaded_bridge() {
            debug!("Host SDK already loaded");
            return Ok(bridge);
        }
        let app_id = self.config.app_id.as_deref();
        let bridge = self
            .breakers
            .host_sdk
            .execute(|| self.sdk.load(app_id))
            .await?;
        debug!(in_client = bridge.is_in_client(), "Host SDK loaded");
        Ok(bridge)
    }

    async fn handle_logged_out(&self, bridge: &Arc<dyn MiniAppBridge>) -> AuthResult<RunOutcome> {
        info!("Host user is signed out");
        if self.config.login_when_logged_out {
            self.breakers
                .host_sdk
                .execute(|| async { bridge.login(None).map_err(AuthError::from) })
                .await?;
        }
        self.adapter.navigation.replace(&self.config.landing_route);
        Ok(RunOutcome::NotLoggedIn)
    }

    /// Profile failures only cost the profile.
    async fn fetch_profile(&self, bridge: &Arc<dyn MiniAppBridge>) -> Option<HostProfile> {
        match self
            .breakers
            .host_sdk
            .execute(|| bridge.get_profile())
            .await
        {
            Ok(profile) => {
                self.audit("profile", |s| {
                    s.record_profile(&serde_json::json!({
                        "userId": profile.user_id,
                        "displayName": profile.display_name,
                        "pictureUrl": profile.picture_url,
                    }))
                });
                Some(profile)
            }
            Err(e) => {
                let err = AuthError::ProfileRetrieval(e.to_string());
                warn!(error = %err, "Continuing without host profile");
                None
            }
        }
    }

    /// Move the run to `Error` and clean up after unrecoverable failures.
    fn fail(&self, err: AuthError) -> AuthError {
        if let Err(e) = self.transition(&HandshakeInput::Fail) {
            debug!(error = %e, "Handshake already terminal");
        }
        let message = err.to_string();
        self.audit("error", |s| s.record_error(&message));

        if auth_error_boundary::is_recoverable(&err) {
            warn!(error = %err, code = err.code(), "Auth handshake failed, recoverable");
        } else {
            warn!(error = %err, code = err.code(), "Auth handshake failed");
            self.adapter.user.clear();
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("auth_error", err.code())
                .finish();
            let route = format!("{}?{}", self.config.landing_route, query);
            self.adapter.navigation.replace(&route);
        }
        err
    }

    fn reset(&self) {
        *self.fsm.lock() = HandshakeMachine::new();
        self.step_tx.send_replace(HandshakeStep::Start);
    }

    fn transition(&self, input: &HandshakeInput) -> AuthResult<HandshakeStep> {
        let mut fsm = self.fsm.lock();
        let old_step = HandshakeStep::from(fsm.state());

        fsm.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in step {}",
                input,
                old_step.as_str()
            ))
        })?;

        let new_step = HandshakeStep::from(fsm.state());
        drop(fsm);

        debug!(from = old_step.as_str(), to = new_step.as_str(), "Handshake step");
        self.audit("step", |s| s.record_step(new_step.as_str(), Utc::now()));
        self.step_tx.send_replace(new_step);
        Ok(new_step)
    }

    /// Audit writes never fail the handshake.
    fn audit(&self, what: &str, write: impl FnOnce(&SessionStore) -> StorageResult<()>) {
        if let Err(e) = write(&self.sessions) {
            warn!(what, error = %e, "Audit write failed");
        }
    }
}

struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> AuthResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AuthError::RunInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
