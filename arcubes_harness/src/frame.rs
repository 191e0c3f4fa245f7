// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted per-frame data.

use alloc::vec;
use alloc::vec::Vec;

use arcubes_core::platform::{BaseLayer, DevicePose, Eye, Viewport, XrFrame, XrView};
use arcubes_core::transform::Transform3d;

use crate::log::FramebufferId;
use crate::system::{ScriptedLayer, ScriptedSpace};

/// Height of the scripted head above the floor.
pub const EYE_HEIGHT: f64 = 1.6;
/// Half the scripted interpupillary distance.
pub const HALF_IPD: f64 = 0.032;

/// One scripted view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScriptedView {
    /// Eye label.
    pub eye: Eye,
    /// Viewport the layer reports for this view.
    pub viewport: Option<Viewport>,
    /// Projection, 16 column-major values.
    pub projection: [f32; 16],
    /// World-to-view matrix the pose reports, 16 column-major values.
    pub view_matrix: [f32; 16],
}

impl ScriptedView {
    /// Creates a view from `f64` transforms.
    #[must_use]
    pub fn new(
        eye: Eye,
        viewport: Option<Viewport>,
        projection: &Transform3d,
        view_matrix: &Transform3d,
    ) -> Self {
        Self {
            eye,
            viewport,
            projection: projection.to_cols_f32(),
            view_matrix: view_matrix.to_cols_f32(),
        }
    }

    /// A view of an eye at `eye_x` meters right of a head at
    /// [`EYE_HEIGHT`], looking down −Z.
    #[must_use]
    pub fn looking_forward(eye: Eye, eye_x: f64, viewport: Viewport) -> Self {
        let aspect = f64::from(viewport.width) / f64::from(viewport.height.max(1));
        let projection = Transform3d::perspective(1.2, aspect, 0.1, 1000.0);
        let view = Transform3d::from_translation(-eye_x, -EYE_HEIGHT, 0.0);
        Self::new(eye, Some(viewport), &projection, &view)
    }
}

impl XrView for ScriptedView {
    fn eye(&self) -> Eye {
        self.eye
    }

    fn projection_matrix(&self) -> [f32; 16] {
        self.projection
    }
}

/// A scripted device pose. View matrices come from the views themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScriptedPose;

impl DevicePose<ScriptedView> for ScriptedPose {
    fn view_matrix(&self, view: &ScriptedView) -> [f32; 16] {
        view.view_matrix
    }
}

/// A scripted frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptedFrame {
    /// Views in delivery order.
    pub views: Vec<ScriptedView>,
    /// Whether a pose is available.
    pub pose_present: bool,
}

impl ScriptedFrame {
    /// A tracked frame with the given views.
    #[must_use]
    pub fn new(views: Vec<ScriptedView>) -> Self {
        Self {
            views,
            pose_present: true,
        }
    }

    /// A handheld frame: one full-screen monoscopic view.
    #[must_use]
    pub fn mono() -> Self {
        Self::new(vec![ScriptedView::looking_forward(
            Eye::None,
            0.0,
            Viewport::new(0, 0, 1080, 1920),
        )])
    }

    /// A headset frame: left and right halves of a 1280×720 framebuffer.
    #[must_use]
    pub fn stereo() -> Self {
        Self::new(vec![
            ScriptedView::looking_forward(Eye::Left, -HALF_IPD, Viewport::new(0, 0, 640, 720)),
            ScriptedView::looking_forward(Eye::Right, HALF_IPD, Viewport::new(640, 0, 640, 720)),
        ])
    }

    /// The same frame with tracking lost.
    #[must_use]
    pub fn without_pose(self) -> Self {
        Self {
            pose_present: false,
            ..self
        }
    }
}

impl XrFrame for ScriptedFrame {
    type Space = ScriptedSpace;
    type View = ScriptedView;
    type Pose = ScriptedPose;

    fn views(&self) -> Vec<ScriptedView> {
        self.views.clone()
    }

    fn device_pose(&self, _space: &ScriptedSpace) -> Option<ScriptedPose> {
        self.pose_present.then_some(ScriptedPose)
    }
}

impl BaseLayer<ScriptedView> for ScriptedLayer {
    type Framebuffer = FramebufferId;

    fn framebuffer(&self) -> Option<FramebufferId> {
        self.framebuffer
    }

    fn viewport(&self, view: &ScriptedView) -> Option<Viewport> {
        view.viewport
    }
}
