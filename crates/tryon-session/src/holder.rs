//! # Session Resource Holder
//!
//! Owns the {camera stream, render session} pair and guarantees they are
//! released together, exactly once.
//!
//! ## Acquisition Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. bootstrap(api_token) ─────────► runtime          (Initialization)   │
//! │  2. create_session(surface) ──────► render session   (Initialization)   │
//! │  3. request_video_stream() ───────► camera stream    (Device / Unknown) │
//! │  4. set_source(stream) ───────────► bound            (Initialization)   │
//! │  5. play() ───────────────────────► rendering        (Initialization)   │
//! │                                                                         │
//! │  Any failure from step 2 on calls release() before the error surfaces. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Release
//! Stops every camera track, then pauses the render session. Secondary
//! errors are logged and swallowed; release always runs to completion and
//! is a no-op on a holder with nothing acquired.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::guard::StepGuard;
use crate::platform::{
    ArRuntime, EffectHandle, MediaStream, Platform, RenderSession, RenderSurface, RuntimeFailure,
    VideoConstraints,
};

/// The exclusively-owned handles of one session.
#[derive(Default)]
pub struct SessionResources {
    runtime: Option<Arc<dyn ArRuntime>>,
    session: Option<Box<dyn RenderSession>>,
    stream: Option<Box<dyn MediaStream>>,

    /// Bound for the pause call during release.
    teardown_timeout: Option<Duration>,
}

impl SessionResources {
    pub fn new(teardown_timeout: Option<Duration>) -> Self {
        SessionResources {
            teardown_timeout,
            ..Default::default()
        }
    }

    /// Both handles are live.
    pub fn is_acquired(&self) -> bool {
        self.session.is_some() && self.stream.is_some()
    }

    /// Nothing is held.
    pub fn is_empty(&self) -> bool {
        self.runtime.is_none() && self.session.is_none() && self.stream.is_none()
    }

    /// A render session is held.
    pub fn holds_render_session(&self) -> bool {
        self.session.is_some()
    }

    /// Stops the camera tracks without awaiting anything.
    ///
    /// For teardown paths that cannot await. The render session, if any, is
    /// left for [`release`](Self::release).
    pub fn stop_tracks_now(&mut self) -> bool {
        match self.stream.take() {
            Some(mut stream) => {
                stream.stop_tracks();
                debug!(stream_id = stream.id(), "Camera tracks stopped");
                true
            }
            None => false,
        }
    }

    /// Runtime of the current acquisition, for effect loading.
    pub fn runtime(&self) -> Option<Arc<dyn ArRuntime>> {
        self.runtime.clone()
    }

    /// Acquires runtime, render session and camera stream, and starts playback.
    ///
    /// A holder that still owns handles from an earlier acquisition releases
    /// them first.
    pub async fn acquire(
        &mut self,
        platform: &Platform,
        api_token: &str,
        surface: &RenderSurface,
        constraints: &VideoConstraints,
        guard: &StepGuard,
    ) -> SessionResult<()> {
        if !self.is_empty() {
            debug!("Holder still owns handles, releasing before re-acquiring");
            self.release().await;
        }

        let result = self
            .acquire_steps(platform, api_token, surface, constraints, guard)
            .await;

        if let Err(ref e) = result {
            debug!(error = %e, "Acquisition failed, releasing partial handles");
            self.release().await;
        }

        result
    }

    async fn acquire_steps(
        &mut self,
        platform: &Platform,
        api_token: &str,
        surface: &RenderSurface,
        constraints: &VideoConstraints,
        guard: &StepGuard,
    ) -> SessionResult<()> {
        let runtime = guard
            .run("bootstrap", async {
                platform
                    .runtime
                    .bootstrap(api_token)
                    .await
                    .map_err(|e| SessionError::initialization("bootstrap", e))
            })
            .await?;
        self.runtime = Some(runtime.clone());
        debug!("AR runtime bootstrapped");

        let session = guard
            .run("create_session", async {
                runtime
                    .create_session(surface)
                    .await
                    .map_err(|e| SessionError::initialization("create_session", e))
            })
            .await?;
        self.session = Some(session);
        debug!(surface = %surface.id, "Render session created");

        let stream = guard
            .run("request_video_stream", async {
                platform
                    .devices
                    .request_video_stream(constraints)
                    .await
                    .map_err(SessionError::from)
            })
            .await?;
        debug!(stream_id = stream.id(), "Camera stream acquired");
        self.stream = Some(stream);

        let (session, stream) = match (self.session.as_mut(), self.stream.as_deref()) {
            (Some(session), Some(stream)) => (session, stream),
            _ => return Err(SessionError::Unknown("handles vanished during acquisition".into())),
        };

        guard
            .run("set_source", async {
                session
                    .set_source(stream)
                    .await
                    .map_err(|e| SessionError::initialization("set_source", e))
            })
            .await?;

        guard
            .run("play", async {
                session
                    .play()
                    .await
                    .map_err(|e| SessionError::initialization("play", e))
            })
            .await?;

        info!(surface = %surface.id, "Camera stream playing");
        Ok(())
    }

    /// Applies a loaded lens to the live session.
    pub async fn apply_effect(
        &mut self,
        effect: &EffectHandle,
        guard: &StepGuard,
    ) -> SessionResult<()> {
        let session = self.session.as_mut().ok_or_else(|| SessionError::AssetLoad {
            effect_id: effect.reference.effect_id.clone(),
            group_id: effect.reference.group_id.clone(),
            message: "no render session to apply the lens to".into(),
        })?;

        guard
            .run("apply_effect", async {
                session
                    .apply_effect(effect)
                    .await
                    .map_err(|e| SessionError::AssetLoad {
                        effect_id: effect.reference.effect_id.clone(),
                        group_id: effect.reference.group_id.clone(),
                        message: e.to_string(),
                    })
            })
            .await
    }

    /// Releases everything held. Best effort, idempotent.
    ///
    /// Returns whether anything was actually released.
    pub async fn release(&mut self) -> bool {
        let mut released = self.stop_tracks_now();

        if let Some(mut session) = self.session.take() {
            let paused = match self.teardown_timeout {
                Some(limit) => tokio::time::timeout(limit, session.pause())
                    .await
                    .unwrap_or_else(|_| {
                        Err(RuntimeFailure::new(format!(
                            "pause timed out after {} seconds",
                            limit.as_secs()
                        )))
                    }),
                None => session.pause().await,
            };
            if let Err(e) = paused {
                warn!(error = %e, "Error pausing render session during teardown");
            } else {
                debug!("Render session paused");
            }
            released = true;
        }

        if self.runtime.take().is_some() {
            released = true;
        }

        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimPlatform, SimScenario};
    use tokio_util::sync::CancellationToken;

    fn guard() -> StepGuard {
        StepGuard::new(CancellationToken::new(), None)
    }

    fn surface() -> RenderSurface {
        RenderSurface::new("canvas", 1280, 720)
    }

    #[tokio::test]
    async fn test_release_on_empty_holder_is_noop() {
        let mut holder = SessionResources::default();
        assert!(!holder.release().await);
        assert!(!holder.release().await);
        assert!(holder.is_empty());
    }

    #[tokio::test]
    async fn test_acquire_release_acquire_starts_clean() {
        let sim = SimPlatform::new(SimScenario::Ok);
        let platform = sim.platform();
        let mut holder = SessionResources::default();

        holder
            .acquire(&platform, "t", &surface(), &VideoConstraints::default(), &guard())
            .await
            .unwrap();
        assert!(holder.is_acquired());

        assert!(holder.release().await);
        assert!(holder.is_empty());
        assert!(!holder.release().await);

        holder
            .acquire(&platform, "t", &surface(), &VideoConstraints::default(), &guard())
            .await
            .unwrap();

        let calls = sim.calls();
        assert_eq!(calls.streams_requested, 2);
        assert_eq!(calls.streams_live(), 1);
        assert_eq!(calls.sessions_live(), 1);
    }

    #[tokio::test]
    async fn test_stop_tracks_now_leaves_session_for_release() {
        let sim = SimPlatform::new(SimScenario::Ok);
        let mut holder = SessionResources::default();
        holder
            .acquire(&sim.platform(), "t", &surface(), &VideoConstraints::default(), &guard())
            .await
            .unwrap();

        assert!(holder.stop_tracks_now());
        assert!(!holder.stop_tracks_now());
        assert!(holder.holds_render_session());
        assert_eq!(sim.calls().streams_live(), 0);
        assert_eq!(sim.calls().sessions_live(), 1);

        assert!(holder.release().await);
        assert_eq!(sim.calls().sessions_live(), 0);
        assert_eq!(sim.calls().tracks_stopped, 1);
    }

    #[tokio::test]
    async fn test_stream_failure_releases_session_once() {
        let sim = SimPlatform::new(SimScenario::CameraDenied);
        let mut holder = SessionResources::default();

        let err = holder
            .acquire(&sim.platform(), "t", &surface(), &VideoConstraints::default(), &guard())
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Device { .. }));
        assert!(holder.is_empty());
        let calls = sim.calls();
        assert_eq!(calls.sessions_created, 1);
        assert_eq!(calls.sessions_paused, 1);
        assert_eq!(calls.streams_acquired, 0);
    }

    #[tokio::test]
    async fn test_pause_failure_is_swallowed() {
        let sim = SimPlatform::new(SimScenario::PauseFails);
        let mut holder = SessionResources::default();
        holder
            .acquire(&sim.platform(), "t", &surface(), &VideoConstraints::default(), &guard())
            .await
            .unwrap();

        assert!(holder.release().await);
        assert!(holder.is_empty());
        assert_eq!(sim.calls().tracks_stopped, 1);
    }

    #[tokio::test]
    async fn test_play_failure_stops_stream() {
        let sim = SimPlatform::new(SimScenario::PlayFails);
        let mut holder = SessionResources::default();
        let err = holder
            .acquire(&sim.platform(), "t", &surface(), &VideoConstraints::default(), &guard())
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Initialization { step: "play", .. }));
        let calls = sim.calls();
        assert_eq!(calls.streams_live(), 0);
        assert_eq!(calls.sessions_live(), 0);
    }
}
