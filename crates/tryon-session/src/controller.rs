//! # Try-On Controller
//!
//! Orchestrates probe, acquisition, lens loading and teardown for one
//! mounted try-on view.
//!
//! ## Controller Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TryOnController                                  │
//! │                                                                         │
//! │  initialize()                                                           │
//! │    │                                                                    │
//! │    ├─► CapabilityProber.probe_camera() ── false ──► Failed(NoCamera)    │
//! │    │                                                                    │
//! │    ├─► SessionResources.acquire() ────── err ──┐                        │
//! │    │                                           │                        │
//! │    ├─► LensLoader.load_effect() ──────── err ──┼─► release()            │
//! │    │                                           │   Failed(kind)         │
//! │    ├─► SessionResources.apply_effect() ─ err ──┘                        │
//! │    │                                                                    │
//! │    └─► Streaming                                                        │
//! │                                                                         │
//! │  cancel_handle().cancel()  (view teardown, any time)                    │
//! │    └─► pending step abandoned ──► release() ──► Disposed                │
//! │                                                                         │
//! │  dispose()                                                              │
//! │    └─► release() ──► Disposed   (idempotent)                            │
//! │                                                                         │
//! │  STATUS EVENTS (to the view):                                           │
//! │  ────────────────────────────                                           │
//! │  emit_status  - { session_id, state, applied_effect, error_message }    │
//! │  emit_error   - { kind, message }                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The controller exclusively owns its resources. The view keeps a clone of
//! the cancellation token, not a reference to the controller, so teardown
//! can be signalled while `initialize` holds `&mut self`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use tryon_core::{EffectRef, ErrorKind, Locale, SessionState, TryOnTarget, TryOnView};

use crate::catalog::ResolvedTarget;
use crate::config::TryOnConfig;
use crate::error::{SessionError, SessionResult};
use crate::guard::StepGuard;
use crate::holder::SessionResources;
use crate::lens::LensLoader;
use crate::platform::{Platform, RenderSurface};
use crate::probe::CapabilityProber;

// =============================================================================
// Session Status
// =============================================================================

/// Snapshot of a controller for the view and the logs.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub target: TryOnTarget,
    pub state: SessionState,
    pub applied_effect: Option<EffectRef>,
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Receives state changes (implemented by the view host).
pub trait SessionEventEmitter: Send + Sync {
    /// Emits after every accepted transition.
    fn emit_status(&self, status: &SessionStatus);

    /// Emits when the session enters `Failed`.
    fn emit_error(&self, kind: ErrorKind, message: &str);
}

/// No-op event emitter.
pub struct NoOpEmitter;

impl SessionEventEmitter for NoOpEmitter {
    fn emit_status(&self, _status: &SessionStatus) {}
    fn emit_error(&self, _kind: ErrorKind, _message: &str) {}
}

// =============================================================================
// Controller
// =============================================================================

/// One try-on session, from mount to teardown.
pub struct TryOnController {
    id: Uuid,
    config: Arc<TryOnConfig>,
    platform: Platform,
    target: ResolvedTarget,
    surface: RenderSurface,

    state: SessionState,
    updated_at: DateTime<Utc>,
    resources: SessionResources,
    applied_effect: Option<EffectRef>,

    lens: LensLoader,
    token: CancellationToken,
    emitter: Arc<dyn SessionEventEmitter>,
}

impl TryOnController {
    /// Creates a controller in `Idle`.
    pub fn new(
        config: Arc<TryOnConfig>,
        platform: Platform,
        target: ResolvedTarget,
        surface: RenderSurface,
    ) -> Self {
        Self::with_emitter(config, platform, target, surface, Arc::new(NoOpEmitter))
    }

    /// Creates a controller with a custom event emitter.
    pub fn with_emitter(
        config: Arc<TryOnConfig>,
        platform: Platform,
        target: ResolvedTarget,
        surface: RenderSurface,
        emitter: Arc<dyn SessionEventEmitter>,
    ) -> Self {
        TryOnController {
            id: Uuid::new_v4(),
            lens: LensLoader::new(config.default_effect()),
            resources: SessionResources::new(config.step_timeout()),
            config,
            platform,
            target,
            surface,
            state: SessionState::Idle,
            updated_at: Utc::now(),
            applied_effect: None,
            token: CancellationToken::new(),
            emitter,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn target(&self) -> &ResolvedTarget {
        &self.target
    }

    /// Lens currently applied, only while streaming.
    pub fn applied_effect(&self) -> Option<&EffectRef> {
        self.applied_effect.as_ref()
    }

    /// Whether camera and render session are currently held.
    pub fn holds_resources(&self) -> bool {
        !self.resources.is_empty()
    }

    /// Token the view cancels on unmount, navigation or target change.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.token.clone()
    }

    fn locale(&self) -> Locale {
        self.config.locale()
    }

    /// User-facing message, when `Failed`.
    pub fn error_message(&self) -> Option<&'static str> {
        self.state.error_kind().map(|kind| kind.user_message(self.locale()))
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id,
            target: self.target.target.clone(),
            state: self.state,
            applied_effect: self.applied_effect.clone(),
            error_message: self.error_message().map(String::from),
            updated_at: self.updated_at,
        }
    }

    /// What the page renders around the canvas.
    pub fn view(&self) -> TryOnView {
        TryOnView::derive(self.target.product.as_ref(), &self.state, self.locale())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Runs the session up to `Streaming` or `Failed`.
    ///
    /// Only a controller in `Idle` starts; any other state is returned
    /// unchanged without touching the camera. Never returns an error: every
    /// failure ends in `Failed(kind)` with resources released, and a
    /// cancellation ends in `Disposed`.
    pub async fn initialize(&mut self) -> SessionState {
        if !self.state.accepts_initialize() {
            debug!(
                session_id = %self.id,
                state = %self.state,
                "Ignoring initialize request"
            );
            return self.state;
        }

        info!(
            session_id = %self.id,
            target = %self.target.target,
            surface = %self.surface.id,
            "Starting try-on session"
        );

        let guard = StepGuard::new(self.token.clone(), self.config.step_timeout());

        self.set_state(SessionState::ProbingCapability);
        let prober = CapabilityProber::new(self.platform.devices.clone());
        let has_camera = match guard
            .run("probe", async { Ok(prober.probe_camera().await) })
            .await
        {
            Ok(found) => found,
            Err(e) if e.is_cancelled() => {
                self.abort(&e).await;
                return self.state;
            }
            Err(e) => {
                self.fail(e).await;
                return self.state;
            }
        };

        if !has_camera {
            self.fail(SessionError::NoCamera).await;
            return self.state;
        }

        self.set_state(SessionState::Initializing);

        match self.start_streaming(&guard).await {
            Ok(()) => self.set_state(SessionState::Streaming),
            Err(e) if e.is_cancelled() => self.abort(&e).await,
            Err(e) => self.fail(e).await,
        }

        self.state
    }

    /// Acquire, then load and apply the lens. Strictly in that order.
    async fn start_streaming(&mut self, guard: &StepGuard) -> SessionResult<()> {
        let api_token = self.config.api_token().to_string();
        let constraints = self.config.video_constraints();

        self.resources
            .acquire(&self.platform, &api_token, &self.surface, &constraints, guard)
            .await?;

        let runtime = self
            .resources
            .runtime()
            .ok_or_else(|| SessionError::Unknown("runtime missing after acquisition".into()))?;

        let (effect_id, group_id) = self.target.effect_ids();
        let effect = self
            .lens
            .load_effect(runtime.as_ref(), effect_id, group_id, guard)
            .await?;

        self.resources.apply_effect(&effect, guard).await?;
        self.applied_effect = Some(effect.reference);
        Ok(())
    }

    /// Tears the session down. Safe to call in any state, any number of times.
    pub async fn dispose(&mut self) {
        self.token.cancel();

        if self.resources.release().await {
            debug!(session_id = %self.id, "Released session resources");
        }
        self.applied_effect = None;

        if !self.state.is_terminal() {
            self.set_state(SessionState::Disposed);
            info!(session_id = %self.id, "Try-on session disposed");
        }
    }

    /// Waits for the view's cancel signal, then disposes.
    ///
    /// Covers a session that already reached `Streaming` or `Failed`, where no
    /// step is pending to observe the token.
    pub async fn dispose_on_cancel(&mut self) {
        self.token.cancelled().await;
        self.dispose().await;
    }

    /// Cancellation path: release whatever exists, go to `Disposed`.
    async fn abort(&mut self, cause: &SessionError) {
        info!(session_id = %self.id, reason = %cause, "Try-on session cancelled");
        self.resources.release().await;
        self.applied_effect = None;
        self.set_state(SessionState::Disposed);
    }

    /// Failure path: log detail, release, go to `Failed(kind)`.
    async fn fail(&mut self, err: SessionError) {
        let kind = err.kind();
        error!(
            session_id = %self.id,
            kind = %kind,
            error = %err,
            "Try-on session failed"
        );

        self.resources.release().await;
        self.applied_effect = None;
        self.set_state(SessionState::Failed(kind));

        let message = kind.user_message(self.locale());
        self.emitter.emit_error(kind, message);
    }

    /// Applies a transition through the central table.
    fn set_state(&mut self, next: SessionState) {
        match self.state.transition(next) {
            Ok(state) => {
                debug!(session_id = %self.id, from = %self.state, to = %state, "State transition");
                self.state = state;
                self.updated_at = Utc::now();
                self.emitter.emit_status(&self.status());
            }
            Err(e) => {
                error!(session_id = %self.id, error = %e, "Rejected state transition");
            }
        }
    }
}

impl Drop for TryOnController {
    fn drop(&mut self) {
        self.token.cancel();

        if self.resources.stop_tracks_now() {
            warn!(session_id = %self.id, "Controller dropped while holding the camera, tracks stopped");
        }
        if self.resources.holds_render_session() {
            warn!(session_id = %self.id, "Controller dropped without dispose, render session left running");
        }
    }
}

// =============================================================================
// Session Slot
// =============================================================================

/// The single session of a mounted try-on view.
///
/// Entering a new session disposes the previous one first, so at most one
/// controller holds the camera per view.
#[derive(Default)]
pub struct SessionSlot {
    current: Option<TryOnController>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&TryOnController> {
        self.current.as_ref()
    }

    /// Disposes the active session, if any, and installs `controller`.
    pub async fn enter(&mut self, controller: TryOnController) -> &mut TryOnController {
        self.leave().await;
        self.current.insert(controller)
    }

    /// Disposes and drops the active session.
    pub async fn leave(&mut self) {
        if let Some(mut previous) = self.current.take() {
            previous.dispose().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimPlatform, SimScenario};

    fn controller(sim: &SimPlatform, target: ResolvedTarget) -> TryOnController {
        TryOnController::new(
            Arc::new(TryOnConfig::default()),
            sim.platform(),
            target,
            RenderSurface::new("canvas", 1280, 720),
        )
    }

    #[tokio::test]
    async fn test_dispose_from_idle_is_noop() {
        let sim = SimPlatform::new(SimScenario::Ok);
        let mut c = controller(&sim, ResolvedTarget::featured());
        c.dispose().await;
        c.dispose().await;
        assert_eq!(c.state(), SessionState::Disposed);
        assert!(sim.calls().events.is_empty());
    }

    #[tokio::test]
    async fn test_error_message_only_when_failed() {
        let sim = SimPlatform::new(SimScenario::NoCamera);
        let mut c = controller(&sim, ResolvedTarget::featured());
        assert_eq!(c.error_message(), None);
        c.initialize().await;
        assert_eq!(
            c.error_message(),
            Some("No se encontró ninguna cámara en el dispositivo.")
        );
        assert!(!c.view().show_canvas);
    }

    #[tokio::test]
    async fn test_status_snapshot() {
        let sim = SimPlatform::new(SimScenario::Ok);
        let mut c = controller(&sim, ResolvedTarget::featured());
        c.initialize().await;
        let status = c.status();
        assert_eq!(status.session_id, c.id());
        assert_eq!(status.state, SessionState::Streaming);
        assert_eq!(status.applied_effect, Some(EffectRef::builtin_default()));
        assert!(status.error_message.is_none());
    }
}
