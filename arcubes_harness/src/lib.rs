// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted in-memory platform for exercising arcubes end to end.
//!
//! [`ScriptedXr`] implements [`XrSystem`](arcubes_core::platform::XrSystem)
//! with futures that are already resolved, so an
//! [`ArLauncher`](arcubes_core::session::ArLauncher) can be driven with any
//! executor (the tests use `pollster`). A [`Script`] picks the one step that
//! fails and how. Every platform, shell, renderer and frame-request call lands
//! in one shared [`CallLog`], in order.

#![no_std]

extern crate alloc;

mod frame;
mod log;
mod system;

pub use frame::{EYE_HEIGHT, HALF_IPD, ScriptedFrame, ScriptedPose, ScriptedView};
pub use log::{Call, CallLog, FramebufferId};
pub use system::{
    Failure, LAYER_FRAMEBUFFER, RecordingRenderer, RecordingRequester, RecordingShell, Script,
    ScriptedContext, ScriptedDevice, ScriptedLayer, ScriptedRenderError, ScriptedSession,
    ScriptedSpace, ScriptedSurface, ScriptedXr,
};

use arcubes_core::config::ArConfig;
use arcubes_core::session::{ArLauncher, SharedLauncher};

/// Launcher type over the scripted platform.
pub type ScriptedLauncher = ArLauncher<ScriptedXr, RecordingShell>;

/// Shared launcher type over the scripted platform.
pub type ScriptedSharedLauncher = SharedLauncher<ScriptedXr, RecordingShell>;

/// Builds a launcher for `script` with the web preset, returning it with
/// its call log.
#[must_use]
pub fn scripted_launcher(script: Script) -> (ScriptedLauncher, CallLog) {
    let log = CallLog::new();
    let system = ScriptedXr::new(script, log.clone());
    let shell = system.shell();
    (ArLauncher::new(system, shell, ArConfig::web()), log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use arcubes_core::config::FrameOfReferenceKind;
    use arcubes_core::error::{Step, XrError};
    use arcubes_core::platform::{UiState, Viewport};
    use arcubes_core::session::{ArSession, ArState};
    use arcubes_core::sync::FrameOutcome;
    use arcubes_core::time::HostTime;
    use arcubes_core::trace::Tracer;
    use arcubes_core::transform::Transform3d;
    use pollster::block_on;

    fn probe(launcher: &mut ScriptedLauncher) -> Result<(), XrError> {
        block_on(launcher.probe(&mut Tracer::none()))
    }

    fn enter(launcher: &mut ScriptedLauncher) -> Result<ArSession<ScriptedXr>, XrError> {
        block_on(launcher.enter_ar(&mut Tracer::none()))
    }

    fn active_session() -> (ArSession<ScriptedXr>, CallLog) {
        let (mut launcher, log) = scripted_launcher(Script::ok());
        probe(&mut launcher).expect("probe succeeds");
        let session = enter(&mut launcher).expect("negotiation succeeds");
        log.take();
        (session, log)
    }

    #[test]
    fn failed_probe_shows_unsupported_and_never_enables_entry() {
        for script in [
            Script::without_api(),
            Script::rejecting(Step::RequestDevice),
            Script::throwing(Step::RequestDevice),
        ] {
            let (mut launcher, log) = scripted_launcher(script);
            let result = probe(&mut launcher);
            assert!(result.is_err(), "{script:?} must fail the probe");
            assert_eq!(launcher.state(), ArState::Unsupported, "{script:?}");
            assert!(launcher.shell().has_state(UiState::Unsupported), "{script:?}");
            assert!(!log.contains(&Call::EnableEntry), "{script:?} enabled entry");
        }
    }

    #[test]
    fn probe_errors_keep_their_cause() {
        let (mut launcher, _) = scripted_launcher(Script::without_api());
        assert_eq!(probe(&mut launcher), Err(XrError::Unsupported));
        let (mut launcher, _) = scripted_launcher(Script::throwing(Step::RequestDevice));
        assert_eq!(
            probe(&mut launcher),
            Err(XrError::Exception(Step::RequestDevice))
        );
    }

    #[test]
    fn missing_entry_element_is_unsupported() {
        let (mut launcher, _) = scripted_launcher(Script::throwing(Step::EnableEntry));
        assert_eq!(
            probe(&mut launcher),
            Err(XrError::Exception(Step::EnableEntry))
        );
        assert_eq!(launcher.state(), ArState::Unsupported);
        assert!(!launcher.shell().entry_enabled());
    }

    #[test]
    fn successful_probe_arms_entry() {
        let (mut launcher, log) = scripted_launcher(Script::ok());
        probe(&mut launcher).expect("probe succeeds");
        assert_eq!(launcher.state(), ArState::DeviceAvailable);
        assert!(launcher.shell().entry_enabled());
        assert_eq!(log.calls(), vec![Call::RequestDevice, Call::EnableEntry]);
    }

    #[test]
    fn every_negotiation_failure_ends_unsupported() {
        let steps = [
            Step::OutputSurface,
            Step::RequestSession,
            Step::AttachSurface,
            Step::CreateRenderer,
            Step::MakeCompatible,
            Step::CreateBaseLayer,
            Step::FrameOfReference,
        ];
        for step in steps {
            for script in [Script::rejecting(step), Script::throwing(step)] {
                let (mut launcher, _) = scripted_launcher(script);
                probe(&mut launcher).expect("probe succeeds");
                let error = enter(&mut launcher).expect_err("negotiation must fail");
                assert_eq!(error.step(), Some(step), "{script:?}");
                assert_eq!(launcher.state(), ArState::Unsupported, "{script:?}");
                assert!(
                    launcher.shell().has_state(UiState::Unsupported),
                    "{script:?} must show unsupported"
                );
            }
        }
    }

    #[test]
    fn rejected_compatibility_stops_before_base_layer() {
        let (mut launcher, log) = scripted_launcher(Script::rejecting(Step::MakeCompatible));
        probe(&mut launcher).expect("probe succeeds");
        assert!(enter(&mut launcher).is_err(), "negotiation must fail");
        assert!(!log.contains(&Call::CreateBaseLayer));
        assert!(!log.contains(&Call::RequestFrameOfReference(
            FrameOfReferenceKind::EyeLevel
        )));
    }

    #[test]
    fn enter_before_probe_is_invalid_and_silent() {
        let (mut launcher, log) = scripted_launcher(Script::ok());
        assert_eq!(
            enter(&mut launcher).map(drop),
            Err(XrError::InvalidState(ArState::NoDevice))
        );
        assert_eq!(launcher.state(), ArState::NoDevice);
        assert!(log.is_empty(), "no side effects: {:?}", log.calls());
    }

    #[test]
    fn enter_after_unsupported_is_invalid_and_silent() {
        let (mut launcher, log) = scripted_launcher(Script::rejecting(Step::RequestSession));
        probe(&mut launcher).expect("probe succeeds");
        assert!(enter(&mut launcher).is_err(), "negotiation must fail");
        let before = log.len();
        assert_eq!(
            enter(&mut launcher).map(drop),
            Err(XrError::InvalidState(ArState::Unsupported))
        );
        assert_eq!(log.len(), before, "no retry path");
    }

    #[test]
    fn second_enter_after_success_is_invalid() {
        let (mut launcher, _) = scripted_launcher(Script::ok());
        probe(&mut launcher).expect("probe succeeds");
        let _session = enter(&mut launcher).expect("negotiation succeeds");
        assert_eq!(
            enter(&mut launcher).map(drop),
            Err(XrError::InvalidState(ArState::SessionActive))
        );
        assert_eq!(launcher.state(), ArState::SessionActive);
    }

    #[test]
    fn second_probe_is_invalid() {
        let (mut launcher, _) = scripted_launcher(Script::ok());
        probe(&mut launcher).expect("probe succeeds");
        assert_eq!(
            probe(&mut launcher),
            Err(XrError::InvalidState(ArState::DeviceAvailable))
        );
    }

    #[test]
    fn negotiation_runs_in_order_with_web_options() {
        let (mut launcher, log) = scripted_launcher(Script::ok());
        probe(&mut launcher).expect("probe succeeds");
        log.take();
        let session = enter(&mut launcher).expect("negotiation succeeds");

        let params = ArConfig::web().renderer;
        assert_eq!(
            log.calls(),
            vec![
                Call::CreateOutputSurface,
                Call::RequestSession {
                    environment_integration: true,
                },
                Call::AttachSurface,
                Call::SetState(UiState::Ar),
                Call::CreateRenderer(params),
                Call::MakeCompatible,
                Call::CreateBaseLayer,
                Call::RequestFrameOfReference(FrameOfReferenceKind::EyeLevel),
            ]
        );
        assert!(!params.auto_clear, "auto-clear must be off");
        assert_eq!(launcher.state(), ArState::SessionActive);
        assert_eq!(session.sync.scene().len(), 64);
        assert!(!session.sync.camera().matrix_auto_update());
    }

    #[test]
    fn stereo_frame_end_to_end() {
        let (mut session, log) = active_session();
        let mut requester = RecordingRequester::new(log.clone());
        let frame = ScriptedFrame::stereo();

        let outcome = session.sync.on_frame(
            HostTime(16_000),
            &frame,
            &mut requester,
            &mut Tracer::none(),
        );
        assert_eq!(outcome, FrameOutcome::Rendered { views: 2, skipped: 0 });

        let calls = log.calls();
        let shape: Vec<&str> = calls
            .iter()
            .map(|call| match call {
                Call::RequestFrame => "request",
                Call::BindFramebuffer(_) => "bind",
                Call::SetViewport(_) => "viewport",
                Call::ClearDepth => "clear-depth",
                Call::ClearColor => "clear-color",
                Call::Render { .. } => "render",
                _ => "other",
            })
            .collect();
        assert_eq!(
            shape,
            [
                "request",
                "bind",
                "viewport",
                "clear-depth",
                "render",
                "viewport",
                "clear-depth",
                "render",
            ]
        );
        assert_eq!(requester.requests(), 1);
        assert_eq!(calls[1], Call::BindFramebuffer(Some(LAYER_FRAMEBUFFER)));
        assert_eq!(calls[2], Call::SetViewport(Viewport::new(0, 0, 640, 720)));
        assert_eq!(calls[5], Call::SetViewport(Viewport::new(640, 0, 640, 720)));

        // Each render saw its own view's matrices.
        for (call, view) in [&calls[4], &calls[7]].into_iter().zip(&frame.views) {
            let Call::Render { projection, world } = call else {
                panic!("expected a render, got {call:?}");
            };
            assert_eq!(projection.to_cols_f32(), view.projection);
            let expected = Transform3d::from_cols_f32(&view.view_matrix)
                .inverse()
                .expect("view matrix is invertible");
            assert!(
                world.approx_eq(&expected, 1e-9),
                "world {world:?} != inverse(view) {expected:?}"
            );
        }
    }

    #[test]
    fn camera_sits_at_the_eye() {
        let (mut session, log) = active_session();
        let mut requester = RecordingRequester::new(log);
        session.sync.on_frame(
            HostTime(0),
            &ScriptedFrame::mono(),
            &mut requester,
            &mut Tracer::none(),
        );
        let [x, y, z] = session.sync.camera().world().translation();
        assert!(x.abs() < 1e-12, "x = {x}");
        assert!((y - EYE_HEIGHT).abs() < 1e-6, "y = {y}");
        assert!(z.abs() < 1e-12, "z = {z}");
    }

    #[test]
    fn lost_pose_skips_one_frame_only() {
        let (mut session, log) = active_session();
        let mut requester = RecordingRequester::new(log.clone());

        let outcome = session.sync.on_frame(
            HostTime(0),
            &ScriptedFrame::stereo().without_pose(),
            &mut requester,
            &mut Tracer::none(),
        );
        assert_eq!(outcome, FrameOutcome::PoseLost);
        assert_eq!(requester.requests(), 1, "next frame still requested");
        assert_eq!(
            log.calls(),
            [Call::RequestFrame, Call::BindFramebuffer(Some(LAYER_FRAMEBUFFER))],
            "only the rebind reaches the renderer"
        );
        assert_eq!(log.count(Call::is_render_call), 1);

        let outcome = session.sync.on_frame(
            HostTime(16_667),
            &ScriptedFrame::stereo(),
            &mut requester,
            &mut Tracer::none(),
        );
        assert_eq!(outcome.views_rendered(), 2);
        assert_eq!(requester.requests(), 2);
    }

    #[test]
    fn k_views_give_k_renders_without_color_clears() {
        for k in 1..=4 {
            let (mut session, log) = active_session();
            let mut requester = RecordingRequester::new(log.clone());
            let views = (0..k)
                .map(|i| {
                    ScriptedView::looking_forward(
                        arcubes_core::platform::Eye::None,
                        f64::from(i) * 0.1,
                        Viewport::new(i * 100, 0, 100, 100),
                    )
                })
                .collect();
            session.sync.on_frame(
                HostTime(0),
                &ScriptedFrame::new(views),
                &mut requester,
                &mut Tracer::none(),
            );
            let renders = log.count(|c| matches!(c, Call::Render { .. }));
            let viewports = log.count(|c| matches!(c, Call::SetViewport(_)));
            let clears = log.count(|c| *c == Call::ClearDepth);
            let expected = usize::try_from(k).unwrap();
            assert_eq!(renders, expected, "k = {k}");
            assert_eq!(viewports, expected, "k = {k}");
            assert_eq!(clears, expected, "k = {k}");
            assert_eq!(log.count(|c| *c == Call::ClearColor), 0, "k = {k}");
        }
    }

    #[test]
    fn render_failure_is_contained_to_its_frame() {
        let (mut launcher, log) = scripted_launcher(Script {
            fail_render_at: Some(1),
            ..Script::ok()
        });
        probe(&mut launcher).expect("probe succeeds");
        let mut session = enter(&mut launcher).expect("negotiation succeeds");
        let mut requester = RecordingRequester::new(log.clone());

        let outcome = session.sync.on_frame(
            HostTime(0),
            &ScriptedFrame::stereo(),
            &mut requester,
            &mut Tracer::none(),
        );
        assert_eq!(
            outcome,
            FrameOutcome::RenderFailed {
                rendered: 1,
                view_index: 1,
                error: ScriptedRenderError { render_index: 1 },
            }
        );

        let outcome = session.sync.on_frame(
            HostTime(16_667),
            &ScriptedFrame::stereo(),
            &mut requester,
            &mut Tracer::none(),
        );
        assert_eq!(outcome.views_rendered(), 2, "the loop keeps going");
        assert_eq!(requester.requests(), 2);
        assert_eq!(session.sync.renderer().render_count(), 4, "failed call counted");
        assert_eq!(launcher.state(), ArState::SessionActive);
    }

    /// Builds a shared launcher whose entry handler queues the handle it
    /// was given. Returns the launcher, a clone of its shell to click, and
    /// the queue.
    fn shared_launcher(
        script: Script,
    ) -> (
        ScriptedSharedLauncher,
        RecordingShell,
        Rc<RefCell<Vec<ScriptedSharedLauncher>>>,
        CallLog,
    ) {
        let log = CallLog::new();
        let system = ScriptedXr::new(script, log.clone());
        let shell = system.shell();
        let queue: Rc<RefCell<Vec<ScriptedSharedLauncher>>> = Rc::default();
        let mut button = None;
        let launcher = SharedLauncher::launch(system, ArConfig::web(), |handle| {
            let queued = Rc::clone(&queue);
            let shell = shell.on_enter(move || queued.borrow_mut().push(handle.clone()));
            button = Some(shell.clone());
            shell
        });
        (launcher, button.expect("launch builds the shell"), queue, log)
    }

    #[test]
    fn click_after_device_check_enters_ar() {
        let (launcher, button, queue, log) = shared_launcher(Script::ok());

        // The startup task owns the only outside handle and ends with it.
        block_on(async move { launcher.probe(&mut Tracer::none()).await })
            .expect("device check succeeds");

        assert!(button.click(), "entry must be wired once a device is found");
        let handle = queue.borrow_mut().pop().expect("the click reached the launcher");
        assert_eq!(handle.state(), ArState::DeviceAvailable);

        let session = block_on(handle.enter_ar(&mut Tracer::none()));
        assert!(session.is_ok(), "{session:?}");
        assert_eq!(handle.state(), ArState::SessionActive);
        assert!(!handle.is_busy());
        assert!(log.contains(&Call::SetState(UiState::Ar)));
    }

    #[test]
    fn click_before_device_check_does_nothing() {
        let (_launcher, button, queue, _log) = shared_launcher(Script::ok());
        assert!(!button.click(), "entry is not wired yet");
        assert!(queue.borrow().is_empty());
    }

    #[test]
    fn repeated_clicks_after_session_are_invalid() {
        let (launcher, button, queue, _log) = shared_launcher(Script::ok());
        block_on(launcher.probe(&mut Tracer::none())).expect("device check succeeds");

        assert!(button.click());
        assert!(button.click());
        let clicks: Vec<_> = queue.borrow_mut().drain(..).collect();
        assert_eq!(clicks.len(), 2);

        assert!(block_on(clicks[0].enter_ar(&mut Tracer::none())).is_ok());
        let second = block_on(clicks[1].enter_ar(&mut Tracer::none()));
        assert_eq!(
            second.err(),
            Some(XrError::InvalidState(ArState::SessionActive))
        );
    }

    #[test]
    fn failed_shared_launch_is_terminal() {
        let (launcher, button, _queue, log) = shared_launcher(Script::without_api());
        let result = block_on(launcher.probe(&mut Tracer::none()));
        assert_eq!(result, Err(XrError::Unsupported));
        assert_eq!(launcher.state(), ArState::Unsupported);
        assert!(!button.click(), "no entry without a device");
        assert!(log.contains(&Call::SetState(UiState::Unsupported)));
    }
}
