//! Command implementations and application wiring.

mod context;

pub use context::AppContext;

use crate::host::{simulated_environment, LocalSessionProvider, SimulatedMiniAppHost};
use crate::HostKind;
use auth_error_boundary::BoundaryOutcome;
use auth_orchestrator::{PreloadedSdk, RunOutcome};
use gig_auth_config::{Config, Paths};
use platform_capability_adapter::{HostEnvironment, MiniAppBridge};
use platform_storage::FileStore;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Back the environment's browser-local store with the on-disk store file.
fn persistent(env: HostEnvironment, paths: &Paths) -> anyhow::Result<HostEnvironment> {
    paths.ensure_dirs()?;
    let storage = Arc::new(FileStore::open(paths.storage_file())?);
    Ok(env.with_local_storage(storage))
}

/// Print the profile the simulated host would get.
pub fn detect(config: Config, host: HostKind, standalone: bool) -> anyhow::Result<()> {
    let env = simulated_environment(host, standalone);
    let ctx = AppContext::new(config, &env)?;
    let adapter = ctx.adapter(&env)?;
    println!("{}", serde_json::to_string_pretty(&adapter.profile)?);
    Ok(())
}

/// Run one health round against the configured backend and the store the
/// selected adapter would use.
pub async fn health(
    config: Config,
    paths: Paths,
    host: HostKind,
    standalone: bool,
) -> anyhow::Result<()> {
    let env = persistent(simulated_environment(host, standalone), &paths)?;
    let ctx = AppContext::new(config, &env)?;

    let snapshot = ctx.health.check_now().await;
    info!(status = snapshot.status.as_str(), "Health check finished");
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Run the embedded mini-app handshake under the error boundary and print
/// how it ended.
pub async fn handshake(
    config: Config,
    paths: Paths,
    id_token: Option<String>,
    display_name: String,
) -> anyhow::Result<()> {
    let (outcome, route) = run_handshake(config, &paths, id_token, display_name).await?;
    println!("{}", serde_json::to_string_pretty(&summarize(&outcome, &route))?);
    Ok(())
}

/// Without an identity token the simulated host user is signed out and the
/// run ends at the landing route. Returns the outcome and the final route.
async fn run_handshake(
    config: Config,
    paths: &Paths,
    id_token: Option<String>,
    display_name: String,
) -> anyhow::Result<(BoundaryOutcome<RunOutcome>, String)> {
    let host: Arc<dyn MiniAppBridge> = Arc::new(match id_token {
        Some(token) => SimulatedMiniAppHost::signed_in(token, display_name.clone()),
        None => SimulatedMiniAppHost::signed_out(),
    });
    let provider = Arc::new(LocalSessionProvider::new(display_name));
    let env = persistent(
        HostEnvironment::new(provider.clone()).with_mini_app_bridge(host.clone()),
        paths,
    )?;

    let ctx = AppContext::new(config, &env)?;
    let adapter = ctx.adapter(&env)?;
    // The gate reads the latest snapshot, so take one before the first attempt
    ctx.health.check_now().await;
    let monitoring = ctx.start_monitoring();

    let orchestrator = Arc::new(ctx.orchestrator(
        adapter.clone(),
        provider,
        Arc::new(PreloadedSdk::new(host)),
    )?);
    let boundary = ctx.boundary();
    let outcome = boundary
        .run(move || {
            let orchestrator = orchestrator.clone();
            async move { orchestrator.run().await }
        })
        .await;

    if monitoring {
        ctx.health.stop_monitoring();
    }
    Ok((outcome, adapter.navigation.current_route()))
}

fn summarize(
    outcome: &BoundaryOutcome<RunOutcome>,
    route: &str,
) -> serde_json::Value {
    match outcome {
        BoundaryOutcome::Succeeded(RunOutcome::Completed(user)) => json!({
            "outcome": "completed",
            "user": user.as_ref(),
            "route": route,
        }),
        BoundaryOutcome::Succeeded(RunOutcome::NotLoggedIn) => json!({
            "outcome": "not_logged_in",
            "route": route,
        }),
        BoundaryOutcome::Failed(report) => json!({
            "outcome": "failed",
            "report": report,
            "route": route,
        }),
        BoundaryOutcome::Cancelled => json!({ "outcome": "cancelled" }),
    }
}

pub fn show_config(config: &Config) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
