//! Auth handshake for the embedded mini-app host.
//!
//! The [`Orchestrator`] turns the host's identity token into an application
//! session:
//!
//! 1. load the host SDK (or reuse the injected bridge)
//! 2. check whether the host user is signed in
//! 3. read the identity token and, best effort, the host profile
//! 4. exchange the token with the identity service ([`IdentityExchange`])
//! 5. sign in to the [`SessionProvider`](platform_capability_adapter::SessionProvider)
//!    with the returned session token
//! 6. publish the user, then navigate to the post-login route
//!
//! Host SDK calls and the exchange each run behind their own circuit
//! breaker ([`HandshakeBreakers`]). Errors are returned as [`AuthError`],
//! which the error boundary classifies through its `Classify` impl.

mod error;
mod exchange;
mod handshake_fsm;
mod orchestrator;
mod sdk;

pub use error::{AuthError, AuthResult};
pub use exchange::{ExchangeRequest, ExchangeResponse, IdentityExchange, IdentityServiceClient};
pub use handshake_fsm::{HandshakeInput, HandshakeMachine, HandshakeMachineState, HandshakeStep};
pub use orchestrator::{
    HandshakeBreakers, Orchestrator, OrchestratorConfig, RunOutcome, HOST_SDK_BREAKER,
    IDENTITY_EXCHANGE_BREAKER,
};
pub use sdk::{MiniAppSdk, PreloadedSdk};
