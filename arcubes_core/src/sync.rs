// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame pose-to-camera synchronization.
//!
//! [`FrameSync::on_frame`] is called once per session frame. It:
//!
//! 1. requests the next frame (always, before anything can fail),
//! 2. queries the device pose in the stored frame of reference,
//! 3. rebinds the base layer's framebuffer,
//! 4. for every view, in delivered order, resizes the viewport, copies the
//!    projection, sets the camera matrix to the inverted view matrix,
//!    propagates it, clears depth and renders.
//!
//! Camera matrices are written from the current frame's pose and view before
//! every render call. A view that cannot be given fresh matrices (no
//! viewport, singular view matrix) is skipped rather than rendered with the
//! previous view's. An empty viewport counts as no viewport.

use alloc::vec::Vec;

use crate::camera::Camera;
use crate::platform::{BaseLayer, DevicePose, FrameRequester, Renderer, XrFrame, XrView};
use crate::scene::Scene;
use crate::time::HostTime;
use crate::trace::{FrameEvent, FrameSkipEvent, FrameSummary, SkipReason, Tracer, ViewRenderEvent};
use crate::transform::Transform3d;

/// What a single [`FrameSync::on_frame`] call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome<E> {
    /// The pose was present; every view was either rendered or skipped.
    Rendered {
        /// Views rendered.
        views: u32,
        /// Views skipped for a missing viewport or a singular view matrix.
        skipped: u32,
    },
    /// No pose this frame. Nothing was rendered.
    PoseLost,
    /// The renderer failed; the remaining views of this frame were
    /// abandoned. The next frame was already requested.
    RenderFailed {
        /// Views rendered before the failure.
        rendered: u32,
        /// Index of the view that failed.
        view_index: u32,
        /// The renderer's error.
        error: E,
    },
}

impl<E> FrameOutcome<E> {
    /// Number of views rendered this frame.
    #[must_use]
    pub const fn views_rendered(&self) -> u32 {
        match self {
            Self::Rendered { views, .. } => *views,
            Self::PoseLost => 0,
            Self::RenderFailed { rendered, .. } => *rendered,
        }
    }
}

/// Owns everything the frame callback touches.
pub struct FrameSync<R, L, S> {
    renderer: R,
    layer: L,
    space: S,
    scene: Scene,
    camera: Camera,
    frame_index: u64,
}

impl<R, L, S> core::fmt::Debug for FrameSync<R, L, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameSync")
            .field("meshes", &self.scene.len())
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl<R: Renderer, L, S> FrameSync<R, L, S> {
    /// Creates a synchronizer. `camera` should have automatic matrix
    /// updates disabled (see [`Camera::new_tracked`]).
    #[must_use]
    pub fn new(renderer: R, layer: L, space: S, scene: Scene, camera: Camera) -> Self {
        Self {
            renderer,
            layer,
            space,
            scene,
            camera,
            frame_index: 0,
        }
    }

    /// The camera as left by the last rendered view.
    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The scene.
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The renderer.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Number of frames handled so far.
    #[must_use]
    pub const fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Handles one session frame.
    pub fn on_frame<F>(
        &mut self,
        time: HostTime,
        frame: &F,
        requester: &mut dyn FrameRequester,
        tracer: &mut Tracer<'_>,
    ) -> FrameOutcome<R::Error>
    where
        F: XrFrame<Space = S>,
        L: BaseLayer<F::View, Framebuffer = R::Framebuffer>,
    {
        requester.request_frame();

        let frame_index = self.frame_index;
        self.frame_index += 1;

        let pose = frame.device_pose(&self.space);
        let views: Vec<F::View> = frame.views();
        let view_count = u32::try_from(views.len()).unwrap_or(u32::MAX);
        tracer.frame(&FrameEvent {
            frame_index,
            time,
            view_count,
            pose_present: pose.is_some(),
        });

        let framebuffer = self.layer.framebuffer();
        self.renderer.bind_framebuffer(framebuffer.as_ref());

        let outcome = match pose {
            Some(pose) => self.render_views(frame_index, &pose, &views, tracer),
            None => {
                tracer.frame_skip(&FrameSkipEvent {
                    frame_index,
                    reason: SkipReason::PoseLost,
                });
                FrameOutcome::PoseLost
            }
        };

        tracer.frame_summary(&FrameSummary {
            frame_index,
            time,
            views_delivered: view_count,
            views_rendered: outcome.views_rendered(),
            pose_present: !matches!(outcome, FrameOutcome::PoseLost),
        });
        outcome
    }

    fn render_views<V, P>(
        &mut self,
        frame_index: u64,
        pose: &P,
        views: &[V],
        tracer: &mut Tracer<'_>,
    ) -> FrameOutcome<R::Error>
    where
        V: XrView,
        P: DevicePose<V>,
        L: BaseLayer<V, Framebuffer = R::Framebuffer>,
    {
        let mut rendered = 0;
        let mut skipped = 0;

        for (view_index, view) in (0_u32..).zip(views) {
            let Some(viewport) = self.layer.viewport(view).filter(|vp| !vp.is_empty()) else {
                tracer.frame_skip(&FrameSkipEvent {
                    frame_index,
                    reason: SkipReason::NoViewport { view_index },
                });
                skipped += 1;
                continue;
            };
            let view_matrix = Transform3d::from_cols_f32(&pose.view_matrix(view));
            let Some(camera_matrix) = view_matrix.inverse() else {
                tracer.frame_skip(&FrameSkipEvent {
                    frame_index,
                    reason: SkipReason::SingularViewMatrix { view_index },
                });
                skipped += 1;
                continue;
            };

            self.renderer.set_viewport(viewport);
            self.camera
                .set_projection_from_cols(&view.projection_matrix());
            self.camera.set_matrix(camera_matrix);
            self.camera.update_matrix_world(true);
            self.renderer.clear_depth();

            tracer.view_render(&ViewRenderEvent {
                frame_index,
                view_index,
                eye: view.eye(),
                viewport,
            });
            if let Err(error) = self.renderer.render(&self.scene, &self.camera) {
                tracer.frame_skip(&FrameSkipEvent {
                    frame_index,
                    reason: SkipReason::RenderFailed { view_index },
                });
                return FrameOutcome::RenderFailed {
                    rendered,
                    view_index,
                    error,
                };
            }
            rendered += 1;
        }

        FrameOutcome::Rendered {
            views: rendered,
            skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Eye, Viewport};
    use crate::scene::CubeGridConfig;
    use alloc::vec;

    #[derive(Clone, Copy)]
    struct MockView {
        eye: Eye,
        projection: [f32; 16],
        view_matrix: [f32; 16],
        viewport: Option<Viewport>,
    }

    impl XrView for MockView {
        fn eye(&self) -> Eye {
            self.eye
        }
        fn projection_matrix(&self) -> [f32; 16] {
            self.projection
        }
    }

    struct MockPose;

    impl DevicePose<MockView> for MockPose {
        fn view_matrix(&self, view: &MockView) -> [f32; 16] {
            view.view_matrix
        }
    }

    struct MockFrame {
        views: Vec<MockView>,
        pose: bool,
    }

    impl XrFrame for MockFrame {
        type Space = ();
        type View = MockView;
        type Pose = MockPose;

        fn views(&self) -> Vec<MockView> {
            self.views.clone()
        }
        fn device_pose(&self, _space: &()) -> Option<MockPose> {
            self.pose.then_some(MockPose)
        }
    }

    struct MockLayer;

    impl BaseLayer<MockView> for MockLayer {
        type Framebuffer = u32;

        fn framebuffer(&self) -> Option<u32> {
            Some(7)
        }
        fn viewport(&self, view: &MockView) -> Option<Viewport> {
            view.viewport
        }
    }

    #[derive(Debug, PartialEq)]
    enum Op {
        Bind(Option<u32>),
        Viewport(Viewport),
        ClearDepth,
        Render {
            projection: Transform3d,
            world: Transform3d,
        },
    }

    #[derive(Default)]
    struct MockRenderer {
        ops: Vec<Op>,
        fail_on_render: Option<usize>,
        renders: usize,
    }

    impl Renderer for MockRenderer {
        type Framebuffer = u32;
        type Error = &'static str;

        fn bind_framebuffer(&mut self, framebuffer: Option<&u32>) {
            self.ops.push(Op::Bind(framebuffer.copied()));
        }
        fn set_viewport(&mut self, viewport: Viewport) {
            self.ops.push(Op::Viewport(viewport));
        }
        fn clear_depth(&mut self) {
            self.ops.push(Op::ClearDepth);
        }
        fn render(&mut self, _scene: &Scene, camera: &Camera) -> Result<(), &'static str> {
            let index = self.renders;
            self.renders += 1;
            if self.fail_on_render == Some(index) {
                return Err("lost context");
            }
            self.ops.push(Op::Render {
                projection: *camera.projection(),
                world: *camera.world(),
            });
            Ok(())
        }
    }

    #[derive(Default)]
    struct Counter(u32);

    impl FrameRequester for Counter {
        fn request_frame(&mut self) {
            self.0 += 1;
        }
    }

    fn sync(renderer: MockRenderer) -> FrameSync<MockRenderer, MockLayer, ()> {
        FrameSync::new(
            renderer,
            MockLayer,
            (),
            Scene::cube_grid(&CubeGridConfig::DEFAULT),
            Camera::new_tracked(),
        )
    }

    fn view(eye: Eye, x: i32, tx: f64) -> MockView {
        let projection = Transform3d::perspective(1.2, 0.5, 0.1, 100.0);
        let view_matrix = Transform3d::from_rotation_y(0.4) * Transform3d::from_translation(tx, -1.6, 0.5);
        MockView {
            eye,
            projection: projection.to_cols_f32(),
            view_matrix: view_matrix.to_cols_f32(),
            viewport: Some(Viewport::new(x, 0, 640, 720)),
        }
    }

    fn stereo() -> MockFrame {
        MockFrame {
            views: vec![view(Eye::Left, 0, 0.03), view(Eye::Right, 640, -0.03)],
            pose: true,
        }
    }

    #[test]
    fn camera_matrices_come_from_pose_and_view() {
        let mut sync = sync(MockRenderer::default());
        let mut requester = Counter::default();
        let frame = MockFrame {
            views: vec![view(Eye::None, 0, 0.25)],
            pose: true,
        };
        let outcome = sync.on_frame(HostTime(0), &frame, &mut requester, &mut Tracer::none());
        assert_eq!(outcome, FrameOutcome::Rendered { views: 1, skipped: 0 });

        let v = &frame.views[0];
        let camera = sync.camera();
        assert_eq!(
            camera.projection().to_cols_f32(),
            v.projection,
            "projection must be copied verbatim"
        );
        let expected_world = Transform3d::from_cols_f32(&v.view_matrix)
            .inverse()
            .expect("test view matrix is invertible");
        assert!(
            camera.world().approx_eq(&expected_world, 1e-9),
            "world must be inverse(view)"
        );
        // Round trip: world * view = identity.
        let round_trip = *camera.world() * Transform3d::from_cols_f32(&v.view_matrix);
        assert!(
            round_trip.approx_eq(&Transform3d::IDENTITY, 1e-9),
            "world * view should be identity, got {round_trip:?}"
        );
    }

    #[test]
    fn each_view_gets_viewport_and_depth_clear_before_render() {
        let mut sync = sync(MockRenderer::default());
        let mut requester = Counter::default();
        let outcome = sync.on_frame(HostTime(0), &stereo(), &mut requester, &mut Tracer::none());
        assert_eq!(outcome, FrameOutcome::Rendered { views: 2, skipped: 0 });

        let ops = &sync.renderer().ops;
        assert_eq!(ops.len(), 7, "bind + 2 × (viewport, clear, render)");
        assert_eq!(ops[0], Op::Bind(Some(7)));
        assert_eq!(ops[1], Op::Viewport(Viewport::new(0, 0, 640, 720)));
        assert_eq!(ops[2], Op::ClearDepth);
        assert!(matches!(ops[3], Op::Render { .. }), "got {:?}", ops[3]);
        assert_eq!(ops[4], Op::Viewport(Viewport::new(640, 0, 640, 720)));
        assert_eq!(ops[5], Op::ClearDepth);
        assert!(matches!(ops[6], Op::Render { .. }), "got {:?}", ops[6]);

        // The two renders saw different camera matrices.
        let (Op::Render { world: left, .. }, Op::Render { world: right, .. }) = (&ops[3], &ops[6])
        else {
            unreachable!()
        };
        assert_ne!(left, right, "each view must set its own matrix");
    }

    #[test]
    fn pose_loss_skips_render_but_keeps_the_loop_alive() {
        let mut sync = sync(MockRenderer::default());
        let mut requester = Counter::default();
        let lost = MockFrame {
            views: vec![view(Eye::None, 0, 0.0)],
            pose: false,
        };

        let outcome = sync.on_frame(HostTime(0), &lost, &mut requester, &mut Tracer::none());
        assert_eq!(outcome, FrameOutcome::PoseLost);
        assert_eq!(requester.0, 1, "next frame must still be requested");
        assert_eq!(sync.renderer().renders, 0, "no render without a pose");

        let found = MockFrame {
            views: vec![view(Eye::None, 0, 0.0)],
            pose: true,
        };
        let outcome = sync.on_frame(HostTime(16_000), &found, &mut requester, &mut Tracer::none());
        assert_eq!(outcome.views_rendered(), 1);
        assert_eq!(requester.0, 2);
        assert_eq!(sync.frame_index(), 2);
    }

    #[test]
    fn framebuffer_is_rebound_even_without_pose() {
        let mut sync = sync(MockRenderer::default());
        let lost = MockFrame {
            views: Vec::new(),
            pose: false,
        };
        sync.on_frame(HostTime(0), &lost, &mut Counter::default(), &mut Tracer::none());
        assert_eq!(sync.renderer().ops, vec![Op::Bind(Some(7))]);
    }

    #[test]
    fn views_without_viewport_or_with_singular_matrix_are_skipped() {
        let mut sync = sync(MockRenderer::default());
        let mut no_viewport = view(Eye::Left, 0, 0.0);
        no_viewport.viewport = None;
        let mut singular = view(Eye::Right, 640, 0.0);
        singular.view_matrix = [0.0; 16];
        let frame = MockFrame {
            views: vec![no_viewport, singular, view(Eye::None, 0, 0.1)],
            pose: true,
        };

        let outcome = sync.on_frame(HostTime(0), &frame, &mut Counter::default(), &mut Tracer::none());
        assert_eq!(outcome, FrameOutcome::Rendered { views: 1, skipped: 2 });
        let renders = sync
            .renderer()
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Render { .. }))
            .count();
        assert_eq!(renders, 1, "only the valid view renders");
    }

    #[test]
    fn empty_viewport_is_skipped_like_a_missing_one() {
        let mut sync = sync(MockRenderer::default());
        let mut zero_width = view(Eye::Left, 0, 0.03);
        zero_width.viewport = Some(Viewport::new(0, 0, 0, 720));
        let frame = MockFrame {
            views: vec![zero_width, view(Eye::Right, 640, -0.03)],
            pose: true,
        };

        let outcome = sync.on_frame(
            HostTime(0),
            &frame,
            &mut Counter::default(),
            &mut Tracer::none(),
        );
        assert_eq!(outcome, FrameOutcome::Rendered { views: 1, skipped: 1 });
        assert!(
            !sync
                .renderer()
                .ops
                .contains(&Op::Viewport(Viewport::new(0, 0, 0, 720))),
            "an empty viewport must never reach the renderer"
        );
    }

    #[test]
    fn render_error_abandons_remaining_views_only() {
        let mut sync = sync(MockRenderer {
            fail_on_render: Some(0),
            ..MockRenderer::default()
        });
        let mut requester = Counter::default();

        let outcome = sync.on_frame(HostTime(0), &stereo(), &mut requester, &mut Tracer::none());
        assert_eq!(
            outcome,
            FrameOutcome::RenderFailed {
                rendered: 0,
                view_index: 0,
                error: "lost context",
            }
        );
        assert_eq!(sync.renderer().renders, 1, "second view must not render");

        let outcome = sync.on_frame(HostTime(16_000), &stereo(), &mut requester, &mut Tracer::none());
        assert_eq!(outcome.views_rendered(), 2, "the next frame renders again");
        assert_eq!(requester.0, 2);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn skips_and_summaries_are_traced() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Sink {
            skips: Vec<SkipReason>,
            summaries: Vec<FrameSummary>,
        }
        impl TraceSink for Sink {
            fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
                self.skips.push(e.reason);
            }
            fn on_frame_summary(&mut self, s: &FrameSummary) {
                self.summaries.push(*s);
            }
        }

        let mut sink = Sink::default();
        let mut sync = sync(MockRenderer::default());
        let lost = MockFrame {
            views: vec![view(Eye::None, 0, 0.0)],
            pose: false,
        };
        sync.on_frame(HostTime(5), &lost, &mut Counter::default(), &mut Tracer::new(&mut sink));

        assert_eq!(sink.skips, vec![SkipReason::PoseLost]);
        assert_eq!(
            sink.summaries,
            vec![FrameSummary {
                frame_index: 0,
                time: HostTime(5),
                views_delivered: 1,
                views_rendered: 0,
                pose_present: false,
            }]
        );
    }
}
