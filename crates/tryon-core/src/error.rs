//! # Error Types
//!
//! Failure taxonomy for the try-on session, plus domain errors for tryon-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tryon-core (this file)                                                │
//! │  ├── ErrorKind        - What the user is told (stable, serializable)   │
//! │  │   └── DeviceErrorKind - Denied / NotFound / Busy                    │
//! │  └── CoreError        - Domain rule violations                         │
//! │                                                                         │
//! │  tryon-session                                                         │
//! │  └── SessionError     - Carries detail, classifies into ErrorKind      │
//! │                                                                         │
//! │  Flow: platform failure → SessionError → ErrorKind → message → View    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::state::SessionState;

// =============================================================================
// Error Kind (user-facing taxonomy)
// =============================================================================

/// Which camera failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DeviceErrorKind {
    /// Permission refused by the user or the platform.
    Denied,
    /// Enumerated earlier but gone at acquisition time.
    NotFound,
    /// Held by another application.
    Busy,
}

/// Classified session failure.
///
/// Every failure reaching the view is one of these. The variant selects the
/// message shown; the detail lives in the logs only.
///
/// ## Recovery Paths
/// ```text
/// NoCamera            → back to the product page
/// Device(Denied)      → change browser / OS camera settings
/// Device(NotFound)    → reconnect the camera, re-enter
/// Device(Busy)        → close the other application, re-enter
/// Initialization      → re-enter (surface_binding: reload the page)
/// AssetLoad           → lens unavailable, re-enter later
/// Unknown             → generic failure
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum ErrorKind {
    /// No video input present at probe time.
    NoCamera,

    /// Camera acquisition failed.
    Device { device: DeviceErrorKind },

    /// AR runtime or render session bootstrap failed.
    Initialization {
        /// The render surface could not be bound to the runtime.
        surface_binding: bool,
    },

    /// The lens could not be resolved or applied.
    AssetLoad,

    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// Shorthand for a device failure kind.
    pub const fn device(kind: DeviceErrorKind) -> Self {
        ErrorKind::Device { device: kind }
    }

    /// Stable short code, used as a log field.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NoCamera => "no_camera",
            ErrorKind::Device { device: DeviceErrorKind::Denied } => "device_denied",
            ErrorKind::Device { device: DeviceErrorKind::NotFound } => "device_not_found",
            ErrorKind::Device { device: DeviceErrorKind::Busy } => "device_busy",
            ErrorKind::Initialization { surface_binding: true } => "surface_binding",
            ErrorKind::Initialization { surface_binding: false } => "initialization",
            ErrorKind::AssetLoad => "asset_load",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Whether the user can fix this without leaving the page.
    ///
    /// Only a permission denial qualifies: the user grants access and
    /// re-enters. Everything else sends them back.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Device {
                device: DeviceErrorKind::Denied
            }
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised by tryon-core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A lifecycle transition outside the table.
    ///
    /// Always a programming error in the caller; the controller logs it and
    /// keeps its current state.
    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },

    /// A document could not be read as a product.
    #[error("Malformed product document {id}: {reason}")]
    MalformedDocument { id: String, reason: String },

    /// Unknown locale tag.
    #[error("Unsupported locale: '{0}'. Valid options: es, en")]
    UnsupportedLocale(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let kinds = [
            ErrorKind::NoCamera,
            ErrorKind::device(DeviceErrorKind::Denied),
            ErrorKind::device(DeviceErrorKind::NotFound),
            ErrorKind::device(DeviceErrorKind::Busy),
            ErrorKind::Initialization { surface_binding: true },
            ErrorKind::Initialization { surface_binding: false },
            ErrorKind::AssetLoad,
            ErrorKind::Unknown,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(ErrorKind::code).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_only_denied_is_user_recoverable() {
        assert!(ErrorKind::device(DeviceErrorKind::Denied).is_user_recoverable());
        assert!(!ErrorKind::device(DeviceErrorKind::Busy).is_user_recoverable());
        assert!(!ErrorKind::NoCamera.is_user_recoverable());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ErrorKind::device(DeviceErrorKind::Busy)).unwrap();
        assert_eq!(json["type"], "device");
        assert_eq!(json["device"], "busy");
    }

    #[test]
    fn test_transition_error_message() {
        let err = CoreError::InvalidTransition {
            from: SessionState::Idle,
            to: SessionState::Streaming,
        };
        assert_eq!(err.to_string(), "Invalid session transition: idle -> streaming");
    }
}
