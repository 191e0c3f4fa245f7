// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session, renderer and scene presets.

use crate::scene::CubeGridConfig;

/// Named coordinate-space anchors a session can report poses in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameOfReferenceKind {
    /// Orientation only, origin at the head.
    HeadModel,
    /// Origin near the user's eyes at session start.
    EyeLevel,
    /// Origin on the floor of the tracked area.
    Stage,
}

impl FrameOfReferenceKind {
    /// Returns the name passed to `requestFrameOfReference`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeadModel => "head-model",
            Self::EyeLevel => "eye-level",
            Self::Stage => "stage",
        }
    }
}

/// Options applied when requesting a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionConfig {
    /// Composite the rendered scene over the camera passthrough.
    pub environment_integration: bool,
}

/// Session request options handed to
/// [`XrSystem::request_session`](crate::platform::XrSystem::request_session).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOptions<C> {
    /// Presentation context the session composites into.
    pub output_context: C,
    /// Composite the rendered scene over the camera passthrough.
    pub environment_integration: bool,
}

/// Renderer construction parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RendererParams {
    /// Allocate an alpha channel so the passthrough shows where nothing is
    /// drawn.
    pub alpha: bool,
    /// Keep the drawing buffer between composites.
    pub preserve_drawing_buffer: bool,
    /// Clear color and depth before every render call.
    pub auto_clear: bool,
}

/// Configuration for an [`ArLauncher`](crate::session::ArLauncher).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArConfig {
    /// Session request options.
    pub session: SessionConfig,
    /// Renderer construction parameters.
    pub renderer: RendererParams,
    /// Frame of reference poses are reported in.
    pub reference: FrameOfReferenceKind,
    /// Cube grid built for each session.
    pub scene: CubeGridConfig,
}

impl ArConfig {
    /// Default configuration for browser AR with camera passthrough.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            session: SessionConfig {
                environment_integration: true,
            },
            renderer: RendererParams {
                alpha: true,
                preserve_drawing_buffer: true,
                // Only depth is cleared, per view.
                auto_clear: false,
            },
            reference: FrameOfReferenceKind::EyeLevel,
            scene: CubeGridConfig::DEFAULT,
        }
    }
}

impl Default for ArConfig {
    fn default() -> Self {
        Self::web()
    }
}
