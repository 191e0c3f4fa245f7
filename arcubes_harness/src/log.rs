// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared, ordered record of every call the scripted platform receives.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use arcubes_core::config::{FrameOfReferenceKind, RendererParams};
use arcubes_core::platform::{UiState, Viewport};
use arcubes_core::transform::Transform3d;

/// Identifies a scripted framebuffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub u32);

/// One observed call.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    /// `XrSystem::request_device`.
    RequestDevice,
    /// `XrSystem::create_output_surface`.
    CreateOutputSurface,
    /// `XrSystem::request_session`.
    RequestSession {
        /// Requested environment integration.
        environment_integration: bool,
    },
    /// `XrSystem::attach_surface`.
    AttachSurface,
    /// `XrSystem::create_renderer`.
    CreateRenderer(RendererParams),
    /// `XrSystem::make_compatible`.
    MakeCompatible,
    /// `XrSystem::create_base_layer`.
    CreateBaseLayer,
    /// `XrSystem::request_frame_of_reference`.
    RequestFrameOfReference(FrameOfReferenceKind),
    /// `UiShell::enable_entry`.
    EnableEntry,
    /// `UiShell::set_state`.
    SetState(UiState),
    /// `Renderer::bind_framebuffer`.
    BindFramebuffer(Option<FramebufferId>),
    /// `Renderer::set_viewport`.
    SetViewport(Viewport),
    /// `Renderer::clear_depth`.
    ClearDepth,
    /// A color clear issued by `Renderer::render` with auto-clear on.
    ClearColor,
    /// `Renderer::render`, with the camera matrices it saw.
    Render {
        /// Camera projection at render time.
        projection: Transform3d,
        /// Camera world matrix at render time.
        world: Transform3d,
    },
    /// `FrameRequester::request_frame`.
    RequestFrame,
}

impl Call {
    /// Returns `true` for calls made by the renderer.
    #[must_use]
    pub fn is_render_call(&self) -> bool {
        matches!(
            self,
            Self::BindFramebuffer(_)
                | Self::SetViewport(_)
                | Self::ClearDepth
                | Self::ClearColor
                | Self::Render { .. }
        )
    }
}

/// A cloneable handle to one shared call list.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call.
    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    /// Returns a copy of every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    /// Returns and clears every call so far.
    pub fn take(&self) -> Vec<Call> {
        core::mem::take(&mut *self.0.borrow_mut())
    }

    /// Counts calls matching `predicate`.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.0.borrow().iter().filter(|call| predicate(call)).count()
    }

    /// Returns `true` if any call equals `call`.
    #[must_use]
    pub fn contains(&self, call: &Call) -> bool {
        self.0.borrow().contains(call)
    }

    /// Number of calls so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` if nothing was called.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}
