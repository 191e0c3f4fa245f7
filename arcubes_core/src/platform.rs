// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contracts for the platform pieces the core drives but does not implement.
//!
//! A backend provides the following pieces:
//!
//! - **[`XrSystem`]**: Capability probing and every asynchronous
//!   negotiation step (session, context compatibility, base layer, frame of
//!   reference), plus creation of the output surface and the renderer.
//!
//! - **[`UiShell`]**: The document-level surface: the "enter AR" trigger and
//!   the body class used as a state flag.
//!
//! - **Per-frame data**: [`XrFrame`], [`XrView`], [`DevicePose`] and
//!   [`BaseLayer`] wrap the objects the session hands to each frame callback.
//!
//! - **[`Renderer`]**: Draws a [`Scene`] through a [`Camera`] into the bound
//!   framebuffer.
//!
//! - **[`FrameRequester`]**: Re-registers the frame callback. The callback
//!   must be re-registered every frame for the loop to continue.
//!
//! # Crate boundaries
//!
//! `arcubes_core` owns the data model, the negotiation sequence and the frame
//! loop. Backend crates implement these traits over real platform objects;
//! the harness crate implements them over scripted in-memory ones.

use core::future::Future;

use crate::camera::Camera;
use crate::config::{FrameOfReferenceKind, RendererParams, SessionOptions};
use crate::error::XrError;
use crate::scene::Scene;

/// An integer pixel rectangle within the base layer's framebuffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    /// Left edge.
    pub x: i32,
    /// Bottom edge (GL convention).
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Creates a viewport.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` if the viewport covers no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Which eye a view is rendered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Eye {
    /// Left eye of a stereo pair.
    Left,
    /// Right eye of a stereo pair.
    Right,
    /// Monoscopic view (handheld AR).
    None,
}

/// Document-level classes used as the application's state flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UiState {
    /// AR could not be started; terminal.
    Unsupported,
    /// A session is presenting.
    Ar,
}

impl UiState {
    /// Returns the CSS class name added to `document.body`.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::Ar => "ar",
        }
    }
}

/// Capability probing and session negotiation.
///
/// Each method maps to one platform call. Asynchronous steps return futures
/// that resolve once the platform promise settles; rejections and
/// synchronous exceptions are both reported as [`XrError`].
pub trait XrSystem {
    /// An AR-capable device.
    type Device;
    /// A live AR session.
    type Session;
    /// The output surface (canvas) the session presents into.
    type Surface;
    /// The presentation context bound to [`Surface`](Self::Surface).
    type OutputContext;
    /// The renderer created for the session.
    type Renderer: Renderer;
    /// The session's base layer.
    type Layer;
    /// The frame of reference poses are expressed in.
    type Space;

    /// Queries the platform for an AR-capable device.
    fn request_device(&self) -> impl Future<Output = Result<Self::Device, XrError>>;

    /// Creates an off-document output surface and its presentation context.
    fn create_output_surface(&self) -> Result<(Self::Surface, Self::OutputContext), XrError>;

    /// Requests an AR session on `device`.
    fn request_session(
        &self,
        device: &Self::Device,
        options: SessionOptions<Self::OutputContext>,
    ) -> impl Future<Output = Result<Self::Session, XrError>>;

    /// Attaches the output surface to the document.
    fn attach_surface(&self, surface: &Self::Surface) -> Result<(), XrError>;

    /// Creates a renderer with its own rendering context.
    fn create_renderer(&self, params: &RendererParams) -> Result<Self::Renderer, XrError>;

    /// Makes the renderer's context compatible with the session's device.
    fn make_compatible(
        &self,
        renderer: &Self::Renderer,
        session: &Self::Session,
    ) -> impl Future<Output = Result<(), XrError>>;

    /// Creates the session's base layer from the renderer's context and
    /// installs it on the session.
    fn create_base_layer(
        &self,
        session: &Self::Session,
        renderer: &Self::Renderer,
    ) -> Result<Self::Layer, XrError>;

    /// Requests a named frame of reference.
    fn request_frame_of_reference(
        &self,
        session: &Self::Session,
        kind: FrameOfReferenceKind,
    ) -> impl Future<Output = Result<Self::Space, XrError>>;
}

/// The document-level UI surface.
pub trait UiShell {
    /// Wires the "enter AR" trigger. Called once, after a device was found.
    fn enable_entry(&mut self) -> Result<(), XrError>;

    /// Adds a state class. Adding the same state twice has no further
    /// effect.
    fn set_state(&mut self, state: UiState);
}

/// One view of a frame.
pub trait XrView {
    /// Which eye this view is for.
    fn eye(&self) -> Eye;

    /// The projection matrix, 16 column-major values.
    fn projection_matrix(&self) -> [f32; 16];
}

/// A device pose for one frame.
pub trait DevicePose<V> {
    /// The world-to-view matrix for `view`, 16 column-major values.
    fn view_matrix(&self, view: &V) -> [f32; 16];
}

/// The data delivered to a frame callback.
pub trait XrFrame {
    /// The frame of reference type poses are queried against.
    type Space;
    /// The view type.
    type View: XrView;
    /// The pose type.
    type Pose: DevicePose<Self::View>;

    /// The views to render, in platform order.
    fn views(&self) -> alloc::vec::Vec<Self::View>;

    /// The device pose relative to `space`, or `None` if tracking is lost.
    fn device_pose(&self, space: &Self::Space) -> Option<Self::Pose>;
}

/// The session's render target.
pub trait BaseLayer<V> {
    /// The framebuffer handle the renderer binds.
    type Framebuffer;

    /// The framebuffer to draw into. `None` means the default framebuffer.
    ///
    /// Queried every frame; the platform may swap it between frames.
    fn framebuffer(&self) -> Option<Self::Framebuffer>;

    /// The region of the framebuffer belonging to `view`.
    fn viewport(&self, view: &V) -> Option<Viewport>;
}

/// Draws a scene.
pub trait Renderer {
    /// The framebuffer handle this renderer can bind.
    type Framebuffer;
    /// Errors reported by [`render`](Self::render).
    type Error: core::fmt::Debug;

    /// Binds the draw target.
    fn bind_framebuffer(&mut self, framebuffer: Option<&Self::Framebuffer>);

    /// Restricts output to `viewport`.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Clears the depth buffer only.
    fn clear_depth(&mut self);

    /// Draws `scene` through `camera` into the current viewport.
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), Self::Error>;
}

/// Re-registers the frame callback for the next display frame.
pub trait FrameRequester {
    /// Requests the next frame.
    fn request_frame(&mut self);
}
