// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted [`XrSystem`], shell, renderer and frame requester.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::future::{Future, ready};

use arcubes_core::camera::Camera;
use arcubes_core::config::{FrameOfReferenceKind, RendererParams, SessionOptions};
use arcubes_core::error::{Step, XrError};
use arcubes_core::platform::{FrameRequester, Renderer, UiShell, UiState, Viewport, XrSystem};
use arcubes_core::scene::Scene;

use crate::log::{Call, CallLog, FramebufferId};

/// How a scripted step fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Failure {
    /// The step's promise rejects.
    Reject,
    /// The step throws synchronously.
    Throw,
}

/// What the scripted platform does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Script {
    /// The device API is missing entirely.
    pub api_absent: bool,
    /// The one step that fails, if any.
    pub failure: Option<(Step, Failure)>,
    /// Index of the render call that fails, if any.
    pub fail_render_at: Option<usize>,
}

impl Script {
    /// Every step succeeds.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            api_absent: false,
            failure: None,
            fail_render_at: None,
        }
    }

    /// The device API is absent.
    #[must_use]
    pub const fn without_api() -> Self {
        Self {
            api_absent: true,
            ..Self::ok()
        }
    }

    /// `step` rejects.
    #[must_use]
    pub const fn rejecting(step: Step) -> Self {
        Self {
            failure: Some((step, Failure::Reject)),
            ..Self::ok()
        }
    }

    /// `step` throws.
    #[must_use]
    pub const fn throwing(step: Step) -> Self {
        Self {
            failure: Some((step, Failure::Throw)),
            ..Self::ok()
        }
    }

    /// Outcome of `step` under this script.
    pub fn check(&self, step: Step) -> Result<(), XrError> {
        match self.failure {
            Some((failing, Failure::Reject)) if failing == step => Err(XrError::Rejected(step)),
            Some((failing, Failure::Throw)) if failing == step => Err(XrError::Exception(step)),
            _ => Ok(()),
        }
    }
}

/// A scripted device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptedDevice;

/// A scripted session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptedSession;

/// A scripted output surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptedSurface;

/// A scripted presentation context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptedContext;

/// A scripted frame of reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptedSpace {
    /// The kind that was requested.
    pub kind: FrameOfReferenceKind,
}

/// A scripted base layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptedLayer {
    /// The framebuffer the layer reports.
    pub framebuffer: Option<FramebufferId>,
}

/// The framebuffer every scripted layer reports.
pub const LAYER_FRAMEBUFFER: FramebufferId = FramebufferId(1);

/// An in-memory [`XrSystem`] whose steps resolve immediately.
#[derive(Clone, Debug)]
pub struct ScriptedXr {
    script: Script,
    log: CallLog,
}

impl ScriptedXr {
    /// Creates a platform following `script` and recording into `log`.
    #[must_use]
    pub fn new(script: Script, log: CallLog) -> Self {
        Self { script, log }
    }

    /// Returns a shell recording into the same log. Its
    /// [`enable_entry`](UiShell::enable_entry) fails if the script names
    /// [`Step::EnableEntry`].
    #[must_use]
    pub fn shell(&self) -> RecordingShell {
        RecordingShell {
            log: self.log.clone(),
            entry: self.script.check(Step::EnableEntry),
            on_enter: None,
        }
    }

    /// The shared call log.
    #[must_use]
    pub fn log(&self) -> &CallLog {
        &self.log
    }
}

impl XrSystem for ScriptedXr {
    type Device = ScriptedDevice;
    type Session = ScriptedSession;
    type Surface = ScriptedSurface;
    type OutputContext = ScriptedContext;
    type Renderer = RecordingRenderer;
    type Layer = ScriptedLayer;
    type Space = ScriptedSpace;

    fn request_device(&self) -> impl Future<Output = Result<ScriptedDevice, XrError>> {
        self.log.push(Call::RequestDevice);
        let result = if self.script.api_absent {
            Err(XrError::Unsupported)
        } else {
            self.script.check(Step::RequestDevice).map(|()| ScriptedDevice)
        };
        ready(result)
    }

    fn create_output_surface(&self) -> Result<(ScriptedSurface, ScriptedContext), XrError> {
        self.log.push(Call::CreateOutputSurface);
        self.script.check(Step::OutputSurface)?;
        Ok((ScriptedSurface, ScriptedContext))
    }

    fn request_session(
        &self,
        _device: &ScriptedDevice,
        options: SessionOptions<ScriptedContext>,
    ) -> impl Future<Output = Result<ScriptedSession, XrError>> {
        self.log.push(Call::RequestSession {
            environment_integration: options.environment_integration,
        });
        ready(self.script.check(Step::RequestSession).map(|()| ScriptedSession))
    }

    fn attach_surface(&self, _surface: &ScriptedSurface) -> Result<(), XrError> {
        self.log.push(Call::AttachSurface);
        self.script.check(Step::AttachSurface)
    }

    fn create_renderer(&self, params: &RendererParams) -> Result<RecordingRenderer, XrError> {
        self.log.push(Call::CreateRenderer(*params));
        self.script.check(Step::CreateRenderer)?;
        Ok(RecordingRenderer {
            log: self.log.clone(),
            auto_clear: params.auto_clear,
            fail_render_at: self.script.fail_render_at,
            renders: 0,
        })
    }

    fn make_compatible(
        &self,
        _renderer: &RecordingRenderer,
        _session: &ScriptedSession,
    ) -> impl Future<Output = Result<(), XrError>> {
        self.log.push(Call::MakeCompatible);
        ready(self.script.check(Step::MakeCompatible))
    }

    fn create_base_layer(
        &self,
        _session: &ScriptedSession,
        _renderer: &RecordingRenderer,
    ) -> Result<ScriptedLayer, XrError> {
        self.log.push(Call::CreateBaseLayer);
        self.script.check(Step::CreateBaseLayer)?;
        Ok(ScriptedLayer {
            framebuffer: Some(LAYER_FRAMEBUFFER),
        })
    }

    fn request_frame_of_reference(
        &self,
        _session: &ScriptedSession,
        kind: FrameOfReferenceKind,
    ) -> impl Future<Output = Result<ScriptedSpace, XrError>> {
        self.log.push(Call::RequestFrameOfReference(kind));
        ready(
            self.script
                .check(Step::FrameOfReference)
                .map(|()| ScriptedSpace { kind }),
        )
    }
}

type EntryHandler = Rc<RefCell<dyn FnMut()>>;

/// A [`UiShell`] that records into a [`CallLog`].
///
/// Clones share the entry handler, so a clone kept outside the launcher acts
/// as the "enter AR" button.
#[derive(Clone)]
pub struct RecordingShell {
    log: CallLog,
    entry: Result<(), XrError>,
    on_enter: Option<EntryHandler>,
}

impl core::fmt::Debug for RecordingShell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordingShell")
            .field("entry", &self.entry)
            .field("has_handler", &self.on_enter.is_some())
            .finish_non_exhaustive()
    }
}

impl RecordingShell {
    /// Sets the handler [`click`](Self::click) runs.
    #[must_use]
    pub fn on_enter(self, handler: impl FnMut() + 'static) -> Self {
        Self {
            on_enter: Some(Rc::new(RefCell::new(handler))),
            ..self
        }
    }

    /// Clicks the entry trigger. The handler only runs once the trigger was
    /// wired; returns whether it ran.
    pub fn click(&self) -> bool {
        if !self.entry_enabled() {
            return false;
        }
        let Some(handler) = &self.on_enter else {
            return false;
        };
        (handler.borrow_mut())();
        true
    }

    /// Returns `true` if `state` was ever set.
    #[must_use]
    pub fn has_state(&self, state: UiState) -> bool {
        self.log.contains(&Call::SetState(state))
    }

    /// Returns `true` if the entry trigger was wired successfully.
    #[must_use]
    pub fn entry_enabled(&self) -> bool {
        self.entry.is_ok() && self.log.contains(&Call::EnableEntry)
    }
}

impl UiShell for RecordingShell {
    fn enable_entry(&mut self) -> Result<(), XrError> {
        self.log.push(Call::EnableEntry);
        self.entry
    }

    fn set_state(&mut self, state: UiState) {
        self.log.push(Call::SetState(state));
    }
}

/// A [`Renderer`] that records into a [`CallLog`].
#[derive(Debug)]
pub struct RecordingRenderer {
    log: CallLog,
    auto_clear: bool,
    fail_render_at: Option<usize>,
    renders: usize,
}

/// Error reported by a scripted render failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptedRenderError {
    /// Index of the failed render call.
    pub render_index: usize,
}

impl RecordingRenderer {
    /// Number of render calls so far, failed ones included.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.renders
    }
}

impl Renderer for RecordingRenderer {
    type Framebuffer = FramebufferId;
    type Error = ScriptedRenderError;

    fn bind_framebuffer(&mut self, framebuffer: Option<&FramebufferId>) {
        self.log.push(Call::BindFramebuffer(framebuffer.copied()));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.log.push(Call::SetViewport(viewport));
    }

    fn clear_depth(&mut self) {
        self.log.push(Call::ClearDepth);
    }

    fn render(&mut self, _scene: &Scene, camera: &Camera) -> Result<(), ScriptedRenderError> {
        let render_index = self.renders;
        self.renders += 1;
        if self.fail_render_at == Some(render_index) {
            return Err(ScriptedRenderError { render_index });
        }
        if self.auto_clear {
            self.log.push(Call::ClearColor);
        }
        self.log.push(Call::Render {
            projection: *camera.projection(),
            world: *camera.world(),
        });
        Ok(())
    }
}

/// A [`FrameRequester`] that records into a [`CallLog`].
#[derive(Clone, Debug)]
pub struct RecordingRequester {
    log: CallLog,
}

impl RecordingRequester {
    /// Creates a requester recording into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }

    /// Number of frames requested so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.log.count(|call| *call == Call::RequestFrame)
    }
}

impl FrameRequester for RecordingRequester {
    fn request_frame(&mut self) {
        self.log.push(Call::RequestFrame);
    }
}
