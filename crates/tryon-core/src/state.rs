//! # Session Lifecycle State
//!
//! The explicit state machine of one try-on session.
//!
//! ## Transition Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Idle ──mount──► ProbingCapability ──no camera──► Failed(NoCamera)    │
//! │    │                     │                              │               │
//! │    │                  camera                            │               │
//! │    │                     ▼                              │               │
//! │    │               Initializing ──any failure──► Failed(kind)          │
//! │    │                     │                              │               │
//! │    │          acquired + lens applied                   │               │
//! │    │                     ▼                              │               │
//! │    │                 Streaming                          │               │
//! │    │                     │                              │               │
//! │    └──cancel─────────────┴──────dispose─────────────────┘               │
//! │                          ▼                                              │
//! │                      Disposed  (terminal)                               │
//! │                                                                         │
//! │   Cancellation also moves ProbingCapability / Initializing → Disposed. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ErrorKind};

/// Lifecycle state of a try-on session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
#[ts(export)]
pub enum SessionState {
    /// Constructed, nothing acquired.
    #[default]
    Idle,

    /// Enumerating input devices.
    ProbingCapability,

    /// Acquiring resources and loading the lens.
    Initializing,

    /// Camera feed is rendering with the lens applied.
    Streaming,

    /// Stopped on a classified failure. Resources already released.
    Failed(ErrorKind),

    /// Torn down. Terminal.
    Disposed,
}

impl SessionState {
    /// Checks a transition against the table.
    pub fn can_transition_to(&self, next: &SessionState) -> bool {
        use SessionState::*;

        match (self, next) {
            (Idle, ProbingCapability) | (Idle, Disposed) => true,
            (ProbingCapability, Initializing)
            | (ProbingCapability, Failed(ErrorKind::NoCamera))
            | (ProbingCapability, Disposed) => true,
            (Initializing, Streaming) | (Initializing, Disposed) => true,
            (Initializing, Failed(kind)) => *kind != ErrorKind::NoCamera,
            (Streaming, Disposed) | (Failed(_), Disposed) => true,
            _ => false,
        }
    }

    /// Validated transition. Returns the new state.
    pub fn transition(&self, next: SessionState) -> CoreResult<SessionState> {
        if self.can_transition_to(&next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                from: *self,
                to: next,
            })
        }
    }

    /// Only a fresh session may start initializing.
    ///
    /// Initializing / Streaming reject to prevent a second camera stream;
    /// Failed / Disposed reject because recovery means a new controller.
    pub fn accepts_initialize(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Disposed)
    }

    /// The failure kind, when in `Failed`.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            SessionState::Failed(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::ProbingCapability => write!(f, "probing_capability"),
            SessionState::Initializing => write!(f, "initializing"),
            SessionState::Streaming => write!(f, "streaming"),
            SessionState::Failed(kind) => write!(f, "failed({})", kind),
            SessionState::Disposed => write!(f, "disposed"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
