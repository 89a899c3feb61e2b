//! Shared fixtures for the session integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tryon_core::{ErrorKind, Product, SessionState};
use tryon_session::{
    RenderSurface, ResolvedTarget, SessionEventEmitter, SessionStatus, SimPlatform, SimScenario,
    TryOnConfig, TryOnController,
};

pub fn surface() -> RenderSurface {
    RenderSurface::new("ar-canvas", 1280, 720)
}

pub fn product_with_lens(id: &str, lens: &str, group: &str) -> Product {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": "Chaqueta vaquera",
        "price": 59.9,
        "arLensId": lens,
        "arLensGroupId": group,
    }))
    .expect("valid product fixture")
}

pub fn controller(sim: &SimPlatform, target: ResolvedTarget) -> TryOnController {
    controller_with_config(sim, target, TryOnConfig::default())
}

pub fn controller_with_config(
    sim: &SimPlatform,
    target: ResolvedTarget,
    config: TryOnConfig,
) -> TryOnController {
    TryOnController::new(Arc::new(config), sim.platform(), target, surface())
}

pub fn sim(scenario: SimScenario) -> SimPlatform {
    SimPlatform::new(scenario)
}

/// Records every emitted status and error.
#[derive(Default)]
pub struct RecordingEmitter {
    pub states: Mutex<Vec<SessionState>>,
    pub errors: Mutex<Vec<(ErrorKind, String)>>,
}

impl RecordingEmitter {
    pub fn states(&self) -> Vec<SessionState> {
        self.states.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<(ErrorKind, String)> {
        self.errors.lock().unwrap().clone()
    }
}

impl SessionEventEmitter for RecordingEmitter {
    fn emit_status(&self, status: &SessionStatus) {
        self.states.lock().unwrap().push(status.state);
    }

    fn emit_error(&self, kind: ErrorKind, message: &str) {
        self.errors.lock().unwrap().push((kind, message.to_string()));
    }
}
