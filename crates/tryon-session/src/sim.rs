//! # Simulated Platform
//!
//! In-process implementations of every platform trait, with scripted
//! outcomes and a shared call log. Drives the command-line tool and the
//! test suites without a camera or an AR runtime.
//!
//! ## Scenarios
//! ```text
//! ok                    camera present, everything succeeds
//! no-camera             enumeration returns no video input
//! enumeration-fails     enumeration itself errors
//! camera-denied         NotAllowedError on request
//! camera-missing        NotFoundError on request
//! camera-busy           NotReadableError on request
//! bootstrap-fails       runtime bootstrap rejects the token
//! surface-binding-fails create_session cannot take over the canvas
//! play-fails            play() rejects
//! pause-fails           pause() rejects during teardown
//! lens-missing          effect repository cannot resolve the lens
//! apply-fails           apply_effect rejects
//! camera-hangs          request_video_stream never resolves
//! lens-hangs            load_effect never resolves
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Notify;

use tryon_core::{EffectRef, Product, PRODUCTS_COLLECTION};

use crate::error::SessionError;
use crate::platform::{
    ArRuntime, ArRuntimeBootstrap, DeviceDescriptor, DeviceFailure, DocumentStore, EffectHandle,
    MediaDevices, MediaStream, Platform, RenderSession, RenderSurface, RuntimeFailure,
    StoreFailure, VideoConstraints,
};

// =============================================================================
// Scenario
// =============================================================================

/// Scripted behaviour of a [`SimPlatform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimScenario {
    Ok,
    NoCamera,
    EnumerationFails,
    CameraDenied,
    CameraMissing,
    CameraBusy,
    BootstrapFails,
    SurfaceBindingFails,
    PlayFails,
    PauseFails,
    LensMissing,
    ApplyFails,
    ProbeHangs,
    CameraHangs,
    LensHangs,
}

impl SimScenario {
    pub const ALL: [SimScenario; 15] = [
        SimScenario::Ok,
        SimScenario::NoCamera,
        SimScenario::EnumerationFails,
        SimScenario::CameraDenied,
        SimScenario::CameraMissing,
        SimScenario::CameraBusy,
        SimScenario::BootstrapFails,
        SimScenario::SurfaceBindingFails,
        SimScenario::PlayFails,
        SimScenario::PauseFails,
        SimScenario::LensMissing,
        SimScenario::ApplyFails,
        SimScenario::ProbeHangs,
        SimScenario::CameraHangs,
        SimScenario::LensHangs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SimScenario::Ok => "ok",
            SimScenario::NoCamera => "no-camera",
            SimScenario::EnumerationFails => "enumeration-fails",
            SimScenario::CameraDenied => "camera-denied",
            SimScenario::CameraMissing => "camera-missing",
            SimScenario::CameraBusy => "camera-busy",
            SimScenario::BootstrapFails => "bootstrap-fails",
            SimScenario::SurfaceBindingFails => "surface-binding-fails",
            SimScenario::PlayFails => "play-fails",
            SimScenario::PauseFails => "pause-fails",
            SimScenario::LensMissing => "lens-missing",
            SimScenario::ApplyFails => "apply-fails",
            SimScenario::ProbeHangs => "probe-hangs",
            SimScenario::CameraHangs => "camera-hangs",
            SimScenario::LensHangs => "lens-hangs",
        }
    }
}

impl std::fmt::Display for SimScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SimScenario {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase().replace('_', "-");
        SimScenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = SimScenario::ALL.iter().map(SimScenario::name).collect();
                SessionError::InvalidConfig(format!(
                    "Unknown scenario: '{}'. Valid options: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

// =============================================================================
// Call Log
// =============================================================================

/// Everything the simulated platform was asked to do.
#[derive(Debug, Clone, Default)]
pub struct SimCalls {
    /// Ordered step names, e.g. `["enumerate", "bootstrap", ...]`.
    pub events: Vec<&'static str>,
    pub api_tokens: Vec<String>,
    pub sessions_created: usize,
    pub sessions_paused: usize,
    pub streams_requested: usize,
    pub streams_acquired: usize,
    pub tracks_stopped: usize,
    pub effects_loaded: Vec<EffectRef>,
    pub effects_applied: Vec<EffectRef>,
}

impl SimCalls {
    /// Streams acquired and not yet stopped.
    pub fn streams_live(&self) -> usize {
        self.streams_acquired - self.tracks_stopped
    }

    /// Render sessions created and not yet paused.
    pub fn sessions_live(&self) -> usize {
        self.sessions_created - self.sessions_paused
    }
}

#[derive(Default)]
struct SimShared {
    calls: Mutex<SimCalls>,
    stream_requested: Notify,
    effect_requested: Notify,
}

impl SimShared {
    fn calls(&self) -> MutexGuard<'_, SimCalls> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, event: &'static str) {
        self.calls().events.push(event);
    }
}

// =============================================================================
// Platform
// =============================================================================

/// Simulated camera + AR runtime.
#[derive(Clone)]
pub struct SimPlatform {
    scenario: SimScenario,
    shared: Arc<SimShared>,
}

impl SimPlatform {
    pub fn new(scenario: SimScenario) -> Self {
        SimPlatform {
            scenario,
            shared: Arc::new(SimShared::default()),
        }
    }

    /// Platform bundle for a controller.
    pub fn platform(&self) -> Platform {
        Platform::new(Arc::new(self.clone()), Arc::new(self.clone()))
    }

    /// Snapshot of the call log.
    pub fn calls(&self) -> SimCalls {
        self.shared.calls().clone()
    }

    /// Resolves once a camera stream has been requested.
    pub async fn stream_requested(&self) {
        self.shared.stream_requested.notified().await;
    }

    /// Resolves once a lens has been requested.
    pub async fn effect_requested(&self) {
        self.shared.effect_requested.notified().await;
    }
}

#[async_trait]
impl MediaDevices for SimPlatform {
    async fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>, DeviceFailure> {
        self.shared.record("enumerate");
        match self.scenario {
            SimScenario::EnumerationFails => Err(DeviceFailure::Other(
                "enumerateDevices is not available".into(),
            )),
            SimScenario::ProbeHangs => std::future::pending().await,
            SimScenario::NoCamera => Ok(vec![DeviceDescriptor {
                device_id: "mic-0".into(),
                kind: crate::platform::DeviceKind::AudioInput,
                label: String::new(),
            }]),
            _ => Ok(vec![DeviceDescriptor::video("cam-0")]),
        }
    }

    async fn request_video_stream(
        &self,
        _constraints: &VideoConstraints,
    ) -> Result<Box<dyn MediaStream>, DeviceFailure> {
        let n = {
            let mut calls = self.shared.calls();
            calls.events.push("request_stream");
            calls.streams_requested += 1;
            calls.streams_requested
        };
        self.shared.stream_requested.notify_one();

        match self.scenario {
            SimScenario::CameraDenied => Err(DeviceFailure::from_dom_name(
                "NotAllowedError",
                "Permission denied",
            )),
            SimScenario::CameraMissing => Err(DeviceFailure::from_dom_name(
                "NotFoundError",
                "Requested device not found",
            )),
            SimScenario::CameraBusy => Err(DeviceFailure::from_dom_name(
                "NotReadableError",
                "Could not start video source",
            )),
            SimScenario::CameraHangs => std::future::pending().await,
            _ => {
                self.shared.calls().streams_acquired += 1;
                Ok(Box::new(SimStream {
                    id: format!("stream-{}", n),
                    stopped: false,
                    shared: self.shared.clone(),
                }))
            }
        }
    }
}

#[async_trait]
impl ArRuntimeBootstrap for SimPlatform {
    async fn bootstrap(&self, api_token: &str) -> Result<Arc<dyn ArRuntime>, RuntimeFailure> {
        {
            let mut calls = self.shared.calls();
            calls.events.push("bootstrap");
            calls.api_tokens.push(api_token.to_string());
        }
        if self.scenario == SimScenario::BootstrapFails {
            return Err(RuntimeFailure::new("invalid API token"));
        }
        Ok(Arc::new(SimRuntime {
            scenario: self.scenario,
            shared: self.shared.clone(),
        }))
    }
}

struct SimRuntime {
    scenario: SimScenario,
    shared: Arc<SimShared>,
}

#[async_trait]
impl ArRuntime for SimRuntime {
    async fn create_session(
        &self,
        surface: &RenderSurface,
    ) -> Result<Box<dyn RenderSession>, RuntimeFailure> {
        self.shared.record("create_session");
        if self.scenario == SimScenario::SurfaceBindingFails {
            return Err(RuntimeFailure::new(
                "InvalidStateError: Failed to execute 'transferControlToOffscreen' on 'HTMLCanvasElement'",
            ));
        }
        self.shared.calls().sessions_created += 1;
        Ok(Box::new(SimSession {
            scenario: self.scenario,
            surface: surface.id.clone(),
            source: None,
            playing: false,
            shared: self.shared.clone(),
        }))
    }

    async fn load_effect(&self, effect: &EffectRef) -> Result<EffectHandle, RuntimeFailure> {
        {
            let mut calls = self.shared.calls();
            calls.events.push("load_effect");
            calls.effects_loaded.push(effect.clone());
        }
        self.shared.effect_requested.notify_one();

        match self.scenario {
            SimScenario::LensMissing => Err(RuntimeFailure::new(format!(
                "lens {} not found in group {}",
                effect.effect_id, effect.group_id
            ))),
            SimScenario::LensHangs => std::future::pending().await,
            _ => Ok(EffectHandle {
                reference: effect.clone(),
                name: Some(format!("sim lens {}", effect.effect_id)),
            }),
        }
    }
}

struct SimStream {
    id: String,
    stopped: bool,
    shared: Arc<SimShared>,
}

impl MediaStream for SimStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn stop_tracks(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        let mut calls = self.shared.calls();
        calls.events.push("stop_tracks");
        calls.tracks_stopped += 1;
    }
}

struct SimSession {
    scenario: SimScenario,
    surface: String,
    source: Option<String>,
    playing: bool,
    shared: Arc<SimShared>,
}

#[async_trait]
impl RenderSession for SimSession {
    async fn set_source(&mut self, stream: &dyn MediaStream) -> Result<(), RuntimeFailure> {
        self.shared.record("set_source");
        self.source = Some(stream.id().to_string());
        Ok(())
    }

    async fn play(&mut self) -> Result<(), RuntimeFailure> {
        self.shared.record("play");
        if self.source.is_none() {
            return Err(RuntimeFailure::new("play() called without a source"));
        }
        if self.scenario == SimScenario::PlayFails {
            return Err(RuntimeFailure::new(format!(
                "render loop failed to start on {}",
                self.surface
            )));
        }
        self.playing = true;
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), RuntimeFailure> {
        {
            let mut calls = self.shared.calls();
            calls.events.push("pause");
            calls.sessions_paused += 1;
        }
        self.playing = false;
        if self.scenario == SimScenario::PauseFails {
            return Err(RuntimeFailure::new("pause rejected"));
        }
        Ok(())
    }

    async fn apply_effect(&mut self, effect: &EffectHandle) -> Result<(), RuntimeFailure> {
        self.shared.record("apply_effect");
        if !self.playing {
            return Err(RuntimeFailure::new("session has no live source"));
        }
        if self.scenario == SimScenario::ApplyFails {
            return Err(RuntimeFailure::new("lens rejected by renderer"));
        }
        self.shared.calls().effects_applied.push(effect.reference.clone());
        Ok(())
    }
}

// =============================================================================
// In-Memory Document Store
// =============================================================================

/// Document store backed by a map, optionally failing every read.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: HashMap<(String, String), serde_json::Value>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every read fails.
    pub fn unavailable() -> Self {
        MemoryStore {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn insert(&mut self, collection: &str, id: &str, document: serde_json::Value) {
        self.documents
            .insert((collection.to_string(), id.to_string()), document);
    }

    /// Builds a store holding the given products under `products`.
    pub fn from_products(products: &[Product]) -> Result<Self, serde_json::Error> {
        let mut store = MemoryStore::new();
        for product in products {
            store.insert(PRODUCTS_COLLECTION, &product.id, serde_json::to_value(product)?);
        }
        Ok(store)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, StoreFailure> {
        if self.unavailable {
            return Err(StoreFailure("service unavailable".into()));
        }
        Ok(self
            .documents
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }
}
