//! # tryon-session: AR Try-On Session Engine
//!
//! Drives one "try before you buy" session: probe for a camera, acquire a
//! camera stream and a render session, load and apply the product's lens,
//! and always tear everything down.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Try-On Engine Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 TryOnController (state machine)                  │  │
//! │  │                                                                  │  │
//! │  │  Owned by the mounted view, one per view (SessionSlot)          │  │
//! │  │  Cancelled through a token when the view goes away              │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │CapabilityProber│  │SessionResources│  │  LensLoader            │    │
//! │  │                │  │                │  │                        │    │
//! │  │ Enumerates     │  │ Runtime,       │  │ Product lens or the    │    │
//! │  │ devices only   │  │ render session,│  │ configured default     │    │
//! │  │                │  │ camera stream  │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                               │                                         │
//! │                               ▼                                         │
//! │             platform traits (MediaDevices, ArRuntime, ...)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`controller`] - Session state machine and the per-view slot
//! - [`holder`] - Exclusive ownership of the camera / render session pair
//! - [`lens`] - Lens resolution and loading
//! - [`probe`] - Camera presence check
//! - [`catalog`] - Product lookup before the session starts
//! - [`guard`] - Cancellation and timeout around each awaited step
//! - [`platform`] - Traits for devices, AR runtime and document store
//! - [`config`] - TOML + environment configuration
//! - [`sim`] - Simulated platform with scripted outcomes
//! - [`error`] - Error types
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use tryon_session::{
//!     resolve_target, MemoryStore, RenderSurface, SimPlatform, SimScenario, TryOnConfig,
//!     TryOnController,
//! };
//! use tryon_core::TryOnTarget;
//!
//! # async fn run() {
//! let config = Arc::new(TryOnConfig::default());
//! let sim = SimPlatform::new(SimScenario::Ok);
//! let target = resolve_target(&MemoryStore::new(), TryOnTarget::Featured).await;
//!
//! let mut controller = TryOnController::new(
//!     config,
//!     sim.platform(),
//!     target,
//!     RenderSurface::new("canvas", 1280, 720),
//! );
//! let unmount = controller.cancel_handle();
//!
//! controller.initialize().await;
//! // ... later, when the view goes away:
//! unmount.cancel();
//! controller.dispose().await;
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod guard;
pub mod holder;
pub mod lens;
pub mod platform;
pub mod probe;
pub mod sim;

pub use catalog::{resolve_target, ResolvedTarget};
pub use config::TryOnConfig;
pub use controller::{
    NoOpEmitter, SessionEventEmitter, SessionSlot, SessionStatus, TryOnController,
};
pub use error::{SessionError, SessionResult};
pub use guard::StepGuard;
pub use holder::SessionResources;
pub use lens::LensLoader;
pub use platform::{
    ArRuntime, ArRuntimeBootstrap, DeviceDescriptor, DeviceFailure, DocumentStore, EffectHandle,
    MediaDevices, MediaStream, Platform, RenderSession, RenderSurface, RuntimeFailure,
    VideoConstraints,
};
pub use probe::CapabilityProber;
pub use sim::{MemoryStore, SimCalls, SimPlatform, SimScenario};
