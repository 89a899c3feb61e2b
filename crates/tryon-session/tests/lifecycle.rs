//! End-to-end lifecycle tests against the simulated platform.

mod common;

use std::sync::Arc;

use common::{controller, controller_with_config, product_with_lens, sim, RecordingEmitter};
use tryon_core::{DeviceErrorKind, EffectRef, ErrorKind, Product, SessionState, TryOnTarget};
use tryon_session::{
    resolve_target, MemoryStore, ResolvedTarget, SessionSlot, SimScenario, TryOnConfig,
    TryOnController,
};

// =============================================================================
// Happy paths
// =============================================================================

#[tokio::test]
async fn test_product_with_lens_streams_with_its_lens() {
    let sim = sim(SimScenario::Ok);
    let target = ResolvedTarget::with_product(product_with_lens("P", "A", "B"));
    let mut c = controller(&sim, target);

    let state = c.initialize().await;

    assert_eq!(state, SessionState::Streaming);
    assert_eq!(c.applied_effect(), Some(&EffectRef::new("A", "B")));

    let calls = sim.calls();
    assert_eq!(calls.effects_loaded, vec![EffectRef::new("A", "B")]);
    assert_eq!(calls.effects_applied, vec![EffectRef::new("A", "B")]);
    assert_eq!(
        calls.events,
        vec![
            "enumerate",
            "bootstrap",
            "create_session",
            "request_stream",
            "set_source",
            "play",
            "load_effect",
            "apply_effect",
        ],
        "lens must only load once the stream is playing"
    );
}

#[tokio::test]
async fn test_generic_try_on_uses_default_lens() {
    let sim = sim(SimScenario::Ok);
    let mut c = controller(&sim, ResolvedTarget::featured());

    assert_eq!(c.initialize().await, SessionState::Streaming);
    assert_eq!(sim.calls().effects_loaded, vec![EffectRef::builtin_default()]);
}

#[tokio::test]
async fn test_product_missing_one_id_uses_default_pair() {
    let sim = sim(SimScenario::Ok);
    let mut product: Product = product_with_lens("P", "A", "B");
    product.ar_lens_group_id = None;
    let mut c = controller(&sim, ResolvedTarget::with_product(product));

    assert_eq!(c.initialize().await, SessionState::Streaming);
    assert_eq!(sim.calls().effects_loaded, vec![EffectRef::builtin_default()]);
}

#[tokio::test]
async fn test_configured_default_and_token_are_used() {
    let sim = sim(SimScenario::Ok);
    let mut config = TryOnConfig::default();
    config.runtime.api_token = "token-xyz".into();
    config.effects.default_effect_id = "house-lens".into();
    config.effects.default_group_id = "house-group".into();
    let mut c = controller_with_config(&sim, ResolvedTarget::featured(), config);

    c.initialize().await;

    let calls = sim.calls();
    assert_eq!(calls.api_tokens, vec!["token-xyz".to_string()]);
    assert_eq!(calls.effects_loaded, vec![EffectRef::new("house-lens", "house-group")]);
}

#[tokio::test]
async fn test_store_failure_still_enters_ar_mode() {
    let sim = sim(SimScenario::Ok);
    let target = resolve_target(&MemoryStore::unavailable(), TryOnTarget::Product("P".into())).await;
    let mut c = controller(&sim, target);

    assert_eq!(c.initialize().await, SessionState::Streaming);
    assert_eq!(sim.calls().effects_loaded, vec![EffectRef::builtin_default()]);
    assert_eq!(c.view().back_href, "/productos");
}

// =============================================================================
// Probe
// =============================================================================

#[tokio::test]
async fn test_no_camera_fails_without_acquisition() {
    for scenario in [SimScenario::NoCamera, SimScenario::EnumerationFails] {
        let sim = sim(scenario);
        let mut c = controller(&sim, ResolvedTarget::featured());

        assert_eq!(c.initialize().await, SessionState::Failed(ErrorKind::NoCamera));

        let calls = sim.calls();
        assert_eq!(calls.events, vec!["enumerate"], "{}", scenario);
        assert_eq!(calls.streams_requested, 0);
        assert_eq!(calls.sessions_created, 0);
        assert!(!c.holds_resources());
    }
}

// =============================================================================
// Failures during initialization
// =============================================================================

#[tokio::test]
async fn test_permission_denied_releases_render_session() {
    let sim = sim(SimScenario::CameraDenied);
    let mut c = controller(&sim, ResolvedTarget::featured());

    let state = c.initialize().await;

    assert_eq!(state, SessionState::Failed(ErrorKind::device(DeviceErrorKind::Denied)));
    let calls = sim.calls();
    assert_eq!(calls.sessions_created, 1);
    assert_eq!(calls.sessions_paused, 1, "render session released exactly once");
    assert_eq!(calls.streams_acquired, 0);
    assert!(!c.holds_resources());

    c.dispose().await;
    assert_eq!(c.state(), SessionState::Disposed);
    assert_eq!(sim.calls().sessions_paused, 1);
}

#[tokio::test]
async fn test_failures_are_classified() {
    let cases = [
        (SimScenario::CameraMissing, ErrorKind::device(DeviceErrorKind::NotFound)),
        (SimScenario::CameraBusy, ErrorKind::device(DeviceErrorKind::Busy)),
        (SimScenario::BootstrapFails, ErrorKind::Initialization { surface_binding: false }),
        (SimScenario::SurfaceBindingFails, ErrorKind::Initialization { surface_binding: true }),
        (SimScenario::PlayFails, ErrorKind::Initialization { surface_binding: false }),
        (SimScenario::LensMissing, ErrorKind::AssetLoad),
        (SimScenario::ApplyFails, ErrorKind::AssetLoad),
    ];

    for (scenario, expected) in cases {
        let sim = sim(scenario);
        let mut c = controller(&sim, ResolvedTarget::featured());

        assert_eq!(c.initialize().await, SessionState::Failed(expected), "{}", scenario);

        let calls = sim.calls();
        assert_eq!(calls.streams_live(), 0, "{} leaked a stream", scenario);
        assert_eq!(calls.sessions_live(), 0, "{} leaked a session", scenario);
        assert!(c.applied_effect().is_none());
        assert!(c.error_message().is_some());
    }
}

#[tokio::test]
async fn test_failure_notifies_emitter_with_message() {
    let sim = sim(SimScenario::CameraBusy);
    let emitter = Arc::new(RecordingEmitter::default());
    let mut c = TryOnController::with_emitter(
        Arc::new(TryOnConfig::default()),
        sim.platform(),
        ResolvedTarget::featured(),
        common::surface(),
        emitter.clone(),
    );

    c.initialize().await;

    let kind = ErrorKind::device(DeviceErrorKind::Busy);
    assert_eq!(
        emitter.states(),
        vec![
            SessionState::ProbingCapability,
            SessionState::Initializing,
            SessionState::Failed(kind),
        ]
    );
    assert_eq!(
        emitter.errors(),
        vec![(kind, "La cámara está siendo utilizada por otra aplicación.".to_string())]
    );
}

// =============================================================================
// Re-entrancy
// =============================================================================

#[tokio::test]
async fn test_second_initialize_does_not_open_second_stream() {
    let sim = sim(SimScenario::Ok);
    let mut c = controller(&sim, ResolvedTarget::featured());

    assert_eq!(c.initialize().await, SessionState::Streaming);
    assert_eq!(c.initialize().await, SessionState::Streaming);

    let calls = sim.calls();
    assert_eq!(calls.streams_requested, 1);
    assert_eq!(calls.sessions_created, 1);
}

#[tokio::test]
async fn test_failed_and_disposed_controllers_are_not_resurrected() {
    let sim = sim(SimScenario::CameraDenied);
    let mut c = controller(&sim, ResolvedTarget::featured());
    c.initialize().await;
    let failed = c.state();

    assert_eq!(c.initialize().await, failed);
    assert_eq!(sim.calls().streams_requested, 1);

    c.dispose().await;
    assert_eq!(c.initialize().await, SessionState::Disposed);
    assert_eq!(sim.calls().streams_requested, 1);
}

// =============================================================================
// Teardown
// =============================================================================

#[tokio::test]
async fn test_dispose_after_streaming_releases_everything() {
    let sim = sim(SimScenario::Ok);
    let emitter = Arc::new(RecordingEmitter::default());
    let mut c = TryOnController::with_emitter(
        Arc::new(TryOnConfig::default()),
        sim.platform(),
        ResolvedTarget::featured(),
        common::surface(),
        emitter.clone(),
    );

    c.initialize().await;
    c.dispose().await;
    c.dispose().await;

    assert_eq!(c.state(), SessionState::Disposed);
    assert!(c.applied_effect().is_none());
    let calls = sim.calls();
    assert_eq!(calls.streams_live(), 0);
    assert_eq!(calls.sessions_live(), 0);
    assert_eq!(calls.tracks_stopped, 1);
    assert_eq!(
        emitter.states(),
        vec![
            SessionState::ProbingCapability,
            SessionState::Initializing,
            SessionState::Streaming,
            SessionState::Disposed,
        ]
    );
}

#[tokio::test]
async fn test_pause_failure_does_not_block_teardown() {
    let sim = sim(SimScenario::PauseFails);
    let mut c = controller(&sim, ResolvedTarget::featured());

    c.initialize().await;
    c.dispose().await;

    assert_eq!(c.state(), SessionState::Disposed);
    assert_eq!(sim.calls().streams_live(), 0);
    assert!(!c.holds_resources());
}

#[tokio::test]
async fn test_unmount_while_initializing_tears_down_partial_handles() {
    let sim = sim(SimScenario::CameraHangs);
    let emitter = Arc::new(RecordingEmitter::default());
    let mut c = TryOnController::with_emitter(
        Arc::new(TryOnConfig::default()),
        sim.platform(),
        ResolvedTarget::featured(),
        common::surface(),
        emitter.clone(),
    );
    let unmount = c.cancel_handle();

    let (state, _) = tokio::join!(c.initialize(), async {
        sim.stream_requested().await;
        unmount.cancel();
    });

    assert_eq!(state, SessionState::Disposed);
    let calls = sim.calls();
    assert_eq!(calls.sessions_created, 1);
    assert_eq!(calls.sessions_live(), 0);
    assert_eq!(calls.streams_acquired, 0);
    assert!(emitter.errors().is_empty(), "cancellation is not a failure");

    c.dispose().await;
    assert_eq!(c.state(), SessionState::Disposed);
}

#[tokio::test]
async fn test_unmount_while_loading_lens_never_applies_it() {
    let sim = sim(SimScenario::LensHangs);
    let mut c = controller(&sim, ResolvedTarget::with_product(product_with_lens("P", "A", "B")));
    let unmount = c.cancel_handle();

    let (state, _) = tokio::join!(c.initialize(), async {
        sim.effect_requested().await;
        unmount.cancel();
    });

    assert_eq!(state, SessionState::Disposed);
    let calls = sim.calls();
    assert!(calls.effects_applied.is_empty());
    assert!(!calls.events.contains(&"apply_effect"));
    assert_eq!(calls.streams_live(), 0);
    assert_eq!(calls.sessions_live(), 0);
}

#[tokio::test]
async fn test_cancelled_before_mount_acquires_nothing() {
    let sim = sim(SimScenario::Ok);
    let mut c = controller(&sim, ResolvedTarget::featured());
    c.cancel_handle().cancel();

    assert_eq!(c.initialize().await, SessionState::Disposed);
    assert_eq!(sim.calls().streams_requested, 0);
}

#[tokio::test(start_paused = true)]
async fn test_hung_step_times_out_when_configured() {
    let sim = sim(SimScenario::CameraHangs);
    let mut config = TryOnConfig::default();
    config.session.step_timeout_secs = Some(10);
    let mut c = controller_with_config(&sim, ResolvedTarget::featured(), config);

    assert_eq!(c.initialize().await, SessionState::Failed(ErrorKind::Unknown));
    assert_eq!(sim.calls().sessions_live(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_hung_probe_times_out_as_unknown() {
    let sim = sim(SimScenario::ProbeHangs);
    let mut config = TryOnConfig::default();
    config.session.step_timeout_secs = Some(5);
    let mut c = controller_with_config(&sim, ResolvedTarget::featured(), config);

    assert_eq!(c.initialize().await, SessionState::Failed(ErrorKind::Unknown));

    let calls = sim.calls();
    assert_eq!(calls.events, vec!["enumerate"]);
    assert_eq!(calls.streams_requested, 0);
    assert_eq!(calls.sessions_created, 0);
}

#[tokio::test]
async fn test_unmount_while_streaming_releases_everything() {
    let sim = sim(SimScenario::Ok);
    let mut c = controller(&sim, ResolvedTarget::featured());
    assert_eq!(c.initialize().await, SessionState::Streaming);

    let unmount = c.cancel_handle();
    let (_, _) = tokio::join!(c.dispose_on_cancel(), async {
        tokio::task::yield_now().await;
        unmount.cancel();
    });

    assert_eq!(c.state(), SessionState::Disposed);
    let calls = sim.calls();
    assert_eq!(calls.streams_live(), 0);
    assert_eq!(calls.sessions_live(), 0);
}

#[tokio::test]
async fn test_dropping_streaming_controller_stops_camera() {
    let sim = sim(SimScenario::Ok);
    let mut c = controller(&sim, ResolvedTarget::featured());
    assert_eq!(c.initialize().await, SessionState::Streaming);

    let unmount = c.cancel_handle();
    unmount.cancel();
    tokio::task::yield_now().await;
    drop(c);

    let calls = sim.calls();
    assert_eq!(calls.streams_live(), 0);
    assert_eq!(calls.tracks_stopped, 1);
}

#[tokio::test]
async fn test_drop_fires_unmount_signal() {
    let sim = sim(SimScenario::Ok);
    let c = controller(&sim, ResolvedTarget::featured());
    let unmount = c.cancel_handle();

    drop(c);

    assert!(unmount.is_cancelled());
    assert!(sim.calls().events.is_empty());
}

// =============================================================================
// One session per view
// =============================================================================

#[tokio::test]
async fn test_entering_new_target_disposes_previous_session() {
    let first_sim = sim(SimScenario::Ok);
    let second_sim = sim(SimScenario::Ok);
    let mut slot = SessionSlot::new();

    let first = slot.enter(controller(&first_sim, ResolvedTarget::featured())).await;
    first.initialize().await;
    let first_id = first.id();
    assert_eq!(first_sim.calls().streams_live(), 1);

    let target = ResolvedTarget::with_product(product_with_lens("P2", "C", "D"));
    let second = slot.enter(controller(&second_sim, target)).await;
    assert_ne!(second.id(), first_id);
    assert_eq!(first_sim.calls().streams_live(), 0, "previous session released first");
    assert_eq!(first_sim.calls().sessions_live(), 0);

    second.initialize().await;
    assert_eq!(second.state(), SessionState::Streaming);

    slot.leave().await;
    assert!(slot.current().is_none());
    assert_eq!(second_sim.calls().streams_live(), 0);
}
