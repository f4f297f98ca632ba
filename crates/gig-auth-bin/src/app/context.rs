//! Composition root: the process-wide collaborators, built once.

use auth_error_boundary::{BoundaryConfig, BoundaryRunner, LogReporter};
use auth_orchestrator::{
    AuthResult, HandshakeBreakers, IdentityServiceClient, MiniAppSdk, Orchestrator,
    OrchestratorConfig,
};
use gig_auth_config::Config;
use health_monitor::{
    BackendReachabilityProbe, ConnectivityProbe, HealthMonitor, HealthProbe, MonitorConfig,
    SessionFreshnessProbe, StorageProbe,
};
use platform_capability_adapter::{
    AdapterResult, AdapterSlot, CapabilityAdapter, CurrentUserContext, HostEnvironment,
    SessionProvider,
};
use platform_storage::SessionStore;
use std::sync::Arc;
use tracing::info;

/// Shared state for one process.
///
/// Both breakers, the health monitor, the adapter slot and the user context
/// exist exactly once here and are handed to everything that needs them.
pub struct AppContext {
    pub config: Arc<Config>,
    pub http_client: reqwest::Client,
    pub breakers: HandshakeBreakers,
    pub health: Arc<HealthMonitor>,
    pub adapter_slot: AdapterSlot,
    pub user: CurrentUserContext,
}

impl AppContext {
    /// Select the adapter for `env`, then point the storage and session
    /// probes at the store that adapter hands to the handshake.
    pub fn new(config: Config, env: &HostEnvironment) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::new();
        let identity_url = config.identity_service_url()?;

        let user = CurrentUserContext::new();
        let adapter_slot = AdapterSlot::new();
        let adapter = adapter_slot.select(env, user.clone())?;

        let probes: Vec<Arc<dyn HealthProbe>> = vec![
            Arc::new(ConnectivityProbe::new(env.connectivity.clone())),
            Arc::new(BackendReachabilityProbe::new(
                http_client.clone(),
                &identity_url,
            )?),
            Arc::new(StorageProbe::new(adapter.storage.clone())),
            Arc::new(SessionFreshnessProbe::new(SessionStore::new(
                adapter.storage.clone(),
            ))),
        ];
        let health = Arc::new(HealthMonitor::new(
            MonitorConfig::from_config(&config),
            probes,
        ));

        info!(
            identity_service_url = %identity_url,
            platform = %adapter.profile.name,
            role = config.role.as_str(),
            execution_context = ?config.execution_context,
            "Auth context initialised"
        );

        Ok(Self {
            config: Arc::new(config),
            http_client,
            breakers: HandshakeBreakers::default(),
            health,
            adapter_slot,
            user,
        })
    }

    /// The process's one adapter. Detection ran in [`AppContext::new`], so
    /// `env` is only consulted if the slot was somehow left empty.
    pub fn adapter(&self, env: &HostEnvironment) -> AdapterResult<Arc<CapabilityAdapter>> {
        self.adapter_slot.select(env, self.user.clone())
    }

    /// A handshake driver sharing this context's breakers and monitor.
    pub fn orchestrator(
        &self,
        adapter: Arc<CapabilityAdapter>,
        provider: Arc<dyn SessionProvider>,
        sdk: Arc<dyn MiniAppSdk>,
    ) -> AuthResult<Orchestrator> {
        let exchange = IdentityServiceClient::from_config(self.http_client.clone(), &self.config)?;
        Ok(Orchestrator::new(
            OrchestratorConfig::from_config(&self.config),
            adapter,
            provider,
            sdk,
            Arc::new(exchange),
            self.breakers.clone(),
        )
        .with_health(self.health.clone()))
    }

    /// An error boundary that words its fallback from this context's monitor.
    pub fn boundary(&self) -> BoundaryRunner {
        BoundaryRunner::new(BoundaryConfig::default(), Arc::new(LogReporter))
            .with_health(self.health.clone())
    }

    /// Start periodic health checks. `false` when suppressed by config.
    pub fn start_monitoring(&self) -> bool {
        self.health.start_monitoring(self.config.health_interval())
    }
}
