//! Handshake state machine using rust-fsm.
//!
//! ## State Diagram
//!
//! ```text
//! Start ──SdkLoad──► SdkLoading ──SdkLoaded──► SdkReady ──CheckLogin──► CheckLoginState
//!                                                                        │         │
//!                                                              LoggedOut │         │ LoggedIn
//!                                                                        ▼         ▼
//!                                                               NotLoggedIn*   TokenRetrieval
//!                                                                                  │ TokenRetrieved
//!                                                                                  ▼
//!                                                                           ProfileRetrieval
//!                                                                                  │ ProfileDone
//!                                                                                  ▼
//!                                                                           BackendExchange
//!                                                                                  │ Exchanged
//!                                                                                  ▼
//!                                                                       NativeSessionEstablish
//!                                                                                  │ SessionEstablished
//!                                                                                  ▼
//!                                                                          ContextPropagate
//!                                                                                  │ Propagated
//!                                                                                  ▼
//!                                                                                Done*
//!
//! Every non-terminal state ──Fail──► Error*
//! ```

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub handshake_machine(Start)

    Start => {
        SdkLoad => SdkLoading,
        Fail => Error
    },
    SdkLoading => {
        SdkLoaded => SdkReady,
        Fail => Error
    },
    SdkReady => {
        CheckLogin => CheckLoginState,
        Fail => Error
    },
    CheckLoginState => {
        LoggedOut => NotLoggedIn,
        LoggedIn => TokenRetrieval,
        Fail => Error
    },
    TokenRetrieval => {
        TokenRetrieved => ProfileRetrieval,
        Fail => Error
    },
    // Profile failures are not fatal, so this step always moves on
    ProfileRetrieval => {
        ProfileDone => BackendExchange,
        Fail => Error
    },
    BackendExchange => {
        Exchanged => NativeSessionEstablish,
        Fail => Error
    },
    NativeSessionEstablish => {
        SessionEstablished => ContextPropagate,
        Fail => Error
    },
    ContextPropagate => {
        Propagated => Done,
        Fail => Error
    }
}

pub use handshake_machine::Input as HandshakeInput;
pub use handshake_machine::State as HandshakeMachineState;
pub use handshake_machine::StateMachine as HandshakeMachine;

/// Handshake step for logs, audit keys and UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeStep {
    Start,
    SdkLoading,
    SdkReady,
    CheckLoginState,
    NotLoggedIn,
    TokenRetrieval,
    ProfileRetrieval,
    BackendExchange,
    NativeSessionEstablish,
    ContextPropagate,
    Done,
    Error,
}

impl HandshakeStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandshakeStep::Start => "start",
            HandshakeStep::SdkLoading => "sdk_loading",
            HandshakeStep::SdkReady => "sdk_ready",
            HandshakeStep::CheckLoginState => "check_login_state",
            HandshakeStep::NotLoggedIn => "not_logged_in",
            HandshakeStep::TokenRetrieval => "token_retrieval",
            HandshakeStep::ProfileRetrieval => "profile_retrieval",
            HandshakeStep::BackendExchange => "backend_exchange",
            HandshakeStep::NativeSessionEstablish => "native_session_establish",
            HandshakeStep::ContextPropagate => "context_propagate",
            HandshakeStep::Done => "done",
            HandshakeStep::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            HandshakeStep::NotLoggedIn | HandshakeStep::Done | HandshakeStep::Error
        )
    }
}

impl From<&HandshakeMachineState> for HandshakeStep {
    fn from(state: &HandshakeMachineState) -> Self {
        match state {
            HandshakeMachineState::Start => HandshakeStep::Start,
            HandshakeMachineState::SdkLoading => HandshakeStep::SdkLoading,
            HandshakeMachineState::SdkReady => HandshakeStep::SdkReady,
            HandshakeMachineState::CheckLoginState => HandshakeStep::CheckLoginState,
            HandshakeMachineState::NotLoggedIn => HandshakeStep::NotLoggedIn,
            HandshakeMachineState::TokenRetrieval => HandshakeStep::TokenRetrieval,
            HandshakeMachineState::ProfileRetrieval => HandshakeStep::ProfileRetrieval,
            HandshakeMachineState::BackendExchange => HandshakeStep::BackendExchange,
            HandshakeMachineState::NativeSessionEstablish => HandshakeStep::NativeSessionEstablish,
            HandshakeMachineState::ContextPropagate => HandshakeStep::ContextPropagate,
            HandshakeMachineState::Done => HandshakeStep::Done,
            HandshakeMachineState::Error => HandshakeStep::Error,
        }
    }
}
