//! # Platform Seams
//!
//! Traits for everything the engine does not own: media devices, the
//! third-party AR runtime and the remote document store.
//!
//! ## Collaborators
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  MediaDevices                        ArRuntimeBootstrap                 │
//! │  ├── enumerate_devices()             └── bootstrap(api_token)           │
//! │  └── request_video_stream()                   │                         │
//! │            │                                  ▼                         │
//! │            ▼                           ArRuntime                        │
//! │      MediaStream                       ├── create_session(surface)      │
//! │      ├── id()                          └── load_effect(ref)             │
//! │      └── stop_tracks()                        │                         │
//! │                                               ▼                         │
//! │  DocumentStore                         RenderSession                    │
//! │  └── get_by_id(collection, id)         ├── set_source / play / pause    │
//! │                                        └── apply_effect                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations map their native errors onto [`DeviceFailure`] and
//! [`RuntimeFailure`]; the engine classifies from there.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tryon_core::EffectRef;

// =============================================================================
// Devices
// =============================================================================

/// Kind of a media device as reported by enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

/// One enumerated device. Enumeration never opens it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub device_id: String,
    pub kind: DeviceKind,
    /// Empty until the user has granted permission on most platforms.
    #[serde(default)]
    pub label: String,
}

impl DeviceDescriptor {
    pub fn video(device_id: impl Into<String>) -> Self {
        DeviceDescriptor {
            device_id: device_id.into(),
            kind: DeviceKind::VideoInput,
            label: String::new(),
        }
    }

    pub fn is_video_input(&self) -> bool {
        self.kind == DeviceKind::VideoInput
    }
}

/// Which camera to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera (selfie).
    #[default]
    User,
    /// Rear camera.
    Environment,
}

/// Constraints for the camera request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConstraints {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        VideoConstraints {
            facing_mode: FacingMode::User,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// Camera failure as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceFailure {
    #[error("camera permission denied: {0}")]
    Denied(String),

    #[error("camera not found: {0}")]
    NotFound(String),

    #[error("camera busy: {0}")]
    Busy(String),

    #[error("{0}")]
    Other(String),
}

impl DeviceFailure {
    /// Maps a platform error name (DOMException style) to a failure.
    ///
    /// ```text
    /// NotAllowedError / SecurityError       → Denied
    /// NotFoundError / OverconstrainedError  → NotFound
    /// NotReadableError / AbortError         → Busy
    /// anything else                         → Other
    /// ```
    pub fn from_dom_name(name: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match name {
            "NotAllowedError" | "SecurityError" | "PermissionDeniedError" => {
                DeviceFailure::Denied(message)
            }
            "NotFoundError" | "OverconstrainedError" | "DevicesNotFoundError" => {
                DeviceFailure::NotFound(message)
            }
            "NotReadableError" | "AbortError" | "TrackStartError" => DeviceFailure::Busy(message),
            other => DeviceFailure::Other(format!("{}: {}", other, message)),
        }
    }
}

/// A live capture stream. Dropping it does not stop the tracks.
pub trait MediaStream: Send + Sync {
    /// Stream identifier, for logs.
    fn id(&self) -> &str;

    /// Stops every track. Must be safe to call twice.
    fn stop_tracks(&mut self);
}

/// Host media device API.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Lists input/output devices without opening any.
    async fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>, DeviceFailure>;

    /// Opens a camera stream. May prompt the user for permission.
    async fn request_video_stream(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn MediaStream>, DeviceFailure>;
}

// =============================================================================
// AR Runtime
// =============================================================================

/// Failure raised by the AR runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuntimeFailure {
    pub message: String,
}

impl RuntimeFailure {
    pub fn new(message: impl Into<String>) -> Self {
        RuntimeFailure {
            message: message.into(),
        }
    }

    /// Whether the runtime could not take over the drawing surface.
    ///
    /// Browsers report this as a failed `transferControlToOffscreen` call,
    /// usually because the canvas was already transferred by an earlier
    /// session on the same page.
    pub fn is_surface_binding(&self) -> bool {
        self.message.contains("transferControlToOffscreen")
    }
}

/// Drawable the render session outputs to, supplied by the view host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSurface {
    /// Host identifier of the canvas element.
    pub id: String,
    pub width: u32,
    pub height: u32,
}

impl RenderSurface {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        RenderSurface {
            id: id.into(),
            width,
            height,
        }
    }
}

/// A lens loaded from the runtime's effect repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectHandle {
    pub reference: EffectRef,
    pub name: Option<String>,
}

/// Runtime's binding between a video source and an output surface.
#[async_trait]
pub trait RenderSession: Send + Sync {
    async fn set_source(&mut self, stream: &dyn MediaStream) -> Result<(), RuntimeFailure>;

    async fn play(&mut self) -> Result<(), RuntimeFailure>;

    /// Stops rendering and releases the source.
    async fn pause(&mut self) -> Result<(), RuntimeFailure>;

    async fn apply_effect(&mut self, effect: &EffectHandle) -> Result<(), RuntimeFailure>;
}

/// A bootstrapped AR runtime.
#[async_trait]
pub trait ArRuntime: Send + Sync {
    async fn create_session(
        &self,
        surface: &RenderSurface,
    ) -> Result<Box<dyn RenderSession>, RuntimeFailure>;

    /// Fetches a lens from the remote effect repository.
    async fn load_effect(&self, effect: &EffectRef) -> Result<EffectHandle, RuntimeFailure>;
}

/// Entry point into the AR runtime SDK.
#[async_trait]
pub trait ArRuntimeBootstrap: Send + Sync {
    async fn bootstrap(&self, api_token: &str) -> Result<Arc<dyn ArRuntime>, RuntimeFailure>;
}

// =============================================================================
// Document Store
// =============================================================================

/// Failure raised by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("document store error: {0}")]
pub struct StoreFailure(pub String);

/// Read-only access to the remote document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches one document, `None` when it does not exist.
    async fn get_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, StoreFailure>;
}

// =============================================================================
// Platform Bundle
// =============================================================================

/// The collaborators a controller needs.
#[derive(Clone)]
pub struct Platform {
    pub devices: Arc<dyn MediaDevices>,
    pub runtime: Arc<dyn ArRuntimeBootstrap>,
}

impl Platform {
    pub fn new(devices: Arc<dyn MediaDevices>, runtime: Arc<dyn ArRuntimeBootstrap>) -> Self {
        Platform { devices, runtime }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_name_mapping() {
        assert_eq!(
            DeviceFailure::from_dom_name("NotAllowedError", "denied"),
            DeviceFailure::Denied("denied".into())
        );
        assert_eq!(
            DeviceFailure::from_dom_name("NotFoundError", "gone"),
            DeviceFailure::NotFound("gone".into())
        );
        assert_eq!(
            DeviceFailure::from_dom_name("NotReadableError", "in use"),
            DeviceFailure::Busy("in use".into())
        );
        assert!(matches!(
            DeviceFailure::from_dom_name("TypeError", "x"),
            DeviceFailure::Other(_)
        ));
    }

    #[test]
    fn test_surface_binding_detection() {
        assert!(RuntimeFailure::new(
            "InvalidStateError: Failed to execute 'transferControlToOffscreen' on 'HTMLCanvasElement'"
        )
        .is_surface_binding());
        assert!(!RuntimeFailure::new("network error").is_surface_binding());
    }

    #[test]
    fn test_default_constraints() {
        let c = VideoConstraints::default();
        assert_eq!(c.facing_mode, FacingMode::User);
        assert_eq!((c.ideal_width, c.ideal_height), (1280, 720));
    }
}
