//! # Session Error Types
//!
//! Error types for the try-on engine.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Device       │  │     AR Runtime          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  NoCamera       │  │  Initialization         │ │
//! │  │  ConfigLoad     │  │  Device(kind)   │  │  AssetLoad              │ │
//! │  │  ConfigSave     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Control      │  │    Internal     │                              │
//! │  │                 │  │                 │                              │
//! │  │  Cancelled      │  │  Unknown        │                              │
//! │  │  Timeout        │  │  Transition     │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant except `Cancelled` and the configuration errors classifies
//! into an [`ErrorKind`] through [`SessionError::kind`].

use thiserror::Error;

use tryon_core::{CoreError, DeviceErrorKind, ErrorKind};

use crate::platform::{DeviceFailure, RuntimeFailure};

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session error type covering all possible engine failures.
#[derive(Debug, Error)]
pub enum SessionError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration.
    #[error("Invalid try-on configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Device Errors
    // =========================================================================
    /// The probe found no video input.
    #[error("No camera found on this device")]
    NoCamera,

    /// Camera acquisition failed.
    #[error("Camera {kind:?}: {message}")]
    Device {
        kind: DeviceErrorKind,
        message: String,
    },

    // =========================================================================
    // AR Runtime Errors
    // =========================================================================
    /// Runtime bootstrap or render session setup failed.
    #[error("AR runtime initialization failed at {step}: {message}")]
    Initialization {
        step: &'static str,
        message: String,
        surface_binding: bool,
    },

    /// Lens could not be resolved or applied.
    #[error("Failed to load lens {effect_id} (group {group_id}): {message}")]
    AssetLoad {
        effect_id: String,
        group_id: String,
        message: String,
    },

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// The view was torn down while a step was pending.
    #[error("Session cancelled during {step}")]
    Cancelled { step: &'static str },

    /// A step exceeded the configured timeout.
    #[error("{step} timed out after {secs} seconds")]
    Timeout { step: &'static str, secs: u64 },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Invalid lifecycle transition.
    #[error(transparent)]
    Transition(#[from] CoreError),

    /// Unclassified failure.
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<DeviceFailure> for SessionError {
    fn from(err: DeviceFailure) -> Self {
        match err {
            DeviceFailure::Denied(message) => SessionError::Device {
                kind: DeviceErrorKind::Denied,
                message,
            },
            DeviceFailure::NotFound(message) => SessionError::Device {
                kind: DeviceErrorKind::NotFound,
                message,
            },
            DeviceFailure::Busy(message) => SessionError::Device {
                kind: DeviceErrorKind::Busy,
                message,
            },
            DeviceFailure::Other(message) => SessionError::Unknown(message),
        }
    }
}

impl SessionError {
    /// Wraps a runtime failure raised while setting the session up.
    pub fn initialization(step: &'static str, err: RuntimeFailure) -> Self {
        SessionError::Initialization {
            step,
            surface_binding: err.is_surface_binding(),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SessionError {
    fn from(err: toml::ser::Error) -> Self {
        SessionError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Classification
// =============================================================================

impl SessionError {
    /// Maps the error onto the user-facing taxonomy.
    ///
    /// Timeouts and anything unexpected are `Unknown`. Cancellation and
    /// configuration errors never reach the view; they map to `Unknown` for
    /// completeness.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::NoCamera => ErrorKind::NoCamera,
            SessionError::Device { kind, .. } => ErrorKind::device(*kind),
            SessionError::Initialization {
                surface_binding, ..
            } => ErrorKind::Initialization {
                surface_binding: *surface_binding,
            },
            SessionError::AssetLoad { .. } => ErrorKind::AssetLoad,
            _ => ErrorKind::Unknown,
        }
    }

    /// Returns true if this error is the teardown signal, not a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionError::Cancelled { .. })
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidConfig(_)
                | SessionError::ConfigLoadFailed(_)
                | SessionError::ConfigSaveFailed(_)
        )
    }
}
