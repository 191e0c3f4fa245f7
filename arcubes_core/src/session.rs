// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capability probe and session negotiation.
//!
//! [`ArLauncher`] walks the platform through one linear sequence:
//!
//! ```text
//!   NoDevice ──probe ok──► DeviceAvailable ──enter_ar──► SessionRequested ──► SessionActive
//!      │                         │                              │
//!      └─────────────────────────┴──────────── any failure ─────┴──► Unsupported (terminal)
//! ```
//!
//! Every failure, whatever the step, collapses to the same outcome: the
//! launcher becomes [`ArState::Unsupported`] and the shell shows
//! [`UiState::Unsupported`]. The typed [`XrError`] is returned to the caller
//! and reported to the tracer for diagnostics.
//!
//! There is no retry path. Once a launcher is `Unsupported` it stays so.
//!
//! In an event-driven host the launcher is reached from two places: the
//! startup task that probes, and the "enter AR" click handler.
//! [`SharedLauncher`] is the handle both hold.

use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use crate::camera::Camera;
use crate::config::{ArConfig, SessionOptions};
use crate::error::XrError;
use crate::platform::{UiShell, UiState, XrSystem};
use crate::scene::Scene;
use crate::sync::FrameSync;
use crate::trace::{NegotiationErrorEvent, StateTransitionEvent, Tracer};

/// Negotiation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArState {
    /// Nothing probed yet.
    NoDevice,
    /// A device was found and the entry trigger is armed.
    DeviceAvailable,
    /// `enter_ar` is negotiating a session.
    SessionRequested,
    /// A session is presenting.
    SessionActive,
    /// AR cannot be started. Terminal.
    Unsupported,
}

impl ArState {
    /// Returns `true` for the terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Unsupported)
    }
}

/// A negotiated session, ready to drive the frame loop.
///
/// The caller owns starting the loop: the first frame is requested from the
/// session once this value is in hand, and every frame is forwarded to
/// [`FrameSync::on_frame`].
pub struct ArSession<X: XrSystem> {
    /// The platform session.
    pub session: X::Session,
    /// The output surface the session presents into. Kept alive with the
    /// session.
    pub surface: X::Surface,
    /// The per-frame synchronizer.
    pub sync: FrameSync<X::Renderer, X::Layer, X::Space>,
}

impl<X: XrSystem> core::fmt::Debug for ArSession<X> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArSession")
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}

/// Drives capability probing and session negotiation.
pub struct ArLauncher<X: XrSystem, U: UiShell> {
    system: X,
    shell: U,
    config: ArConfig,
    state: ArState,
    device: Option<X::Device>,
}

impl<X: XrSystem, U: UiShell> core::fmt::Debug for ArLauncher<X, U> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArLauncher")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("has_device", &self.device.is_some())
            .finish_non_exhaustive()
    }
}

impl<X: XrSystem, U: UiShell> ArLauncher<X, U> {
    /// Creates a launcher in [`ArState::NoDevice`].
    #[must_use]
    pub fn new(system: X, shell: U, config: ArConfig) -> Self {
        Self {
            system,
            shell,
            config,
            state: ArState::NoDevice,
            device: None,
        }
    }

    /// Current negotiation state.
    #[must_use]
    pub const fn state(&self) -> ArState {
        self.state
    }

    /// The configuration this launcher negotiates with.
    #[must_use]
    pub const fn config(&self) -> &ArConfig {
        &self.config
    }

    /// The platform.
    #[must_use]
    pub const fn system(&self) -> &X {
        &self.system
    }

    /// The UI shell.
    #[must_use]
    pub const fn shell(&self) -> &U {
        &self.shell
    }

    /// Queries the platform for an AR-capable device.
    ///
    /// On success the device is stored, the entry trigger is enabled and the
    /// state becomes [`ArState::DeviceAvailable`]. On any failure the
    /// launcher becomes [`ArState::Unsupported`]. Only valid from
    /// [`ArState::NoDevice`].
    pub async fn probe(&mut self, tracer: &mut Tracer<'_>) -> Result<(), XrError> {
        if self.state != ArState::NoDevice {
            return Err(XrError::InvalidState(self.state));
        }

        let device = match self.system.request_device().await {
            Ok(device) => device,
            Err(error) => return Err(self.fail(error, tracer)),
        };
        self.device = Some(device);

        if let Err(error) = self.shell.enable_entry() {
            return Err(self.fail(error, tracer));
        }
        self.transition(ArState::DeviceAvailable, tracer);
        Ok(())
    }

    /// Negotiates a session and prepares the frame loop.
    ///
    /// Only valid from [`ArState::DeviceAvailable`]. Any other state
    /// (negotiation in flight, session active, unsupported) yields
    /// [`XrError::InvalidState`] with no side effects.
    pub async fn enter_ar(&mut self, tracer: &mut Tracer<'_>) -> Result<ArSession<X>, XrError> {
        if self.state != ArState::DeviceAvailable {
            return Err(XrError::InvalidState(self.state));
        }
        let Some(device) = self.device.as_ref() else {
            return Err(XrError::InvalidState(self.state));
        };
        self.state = ArState::SessionRequested;
        tracer.state_transition(&StateTransitionEvent {
            from: ArState::DeviceAvailable,
            to: ArState::SessionRequested,
        });

        let result = negotiate(&self.system, &mut self.shell, device, &self.config).await;
        match result {
            Ok(session) => {
                self.transition(ArState::SessionActive, tracer);
                Ok(session)
            }
            Err(error) => Err(self.fail(error, tracer)),
        }
    }

    fn transition(&mut self, to: ArState, tracer: &mut Tracer<'_>) {
        let from = self.state;
        self.state = to;
        tracer.state_transition(&StateTransitionEvent { from, to });
    }

    fn fail(&mut self, error: XrError, tracer: &mut Tracer<'_>) -> XrError {
        tracer.negotiation_error(&NegotiationErrorEvent {
            state: self.state,
            error,
        });
        if !self.state.is_terminal() {
            self.transition(ArState::Unsupported, tracer);
        }
        self.shell.set_state(UiState::Unsupported);
        error
    }
}

/// A cloneable handle to one [`ArLauncher`], for hosts where the probe and
/// the entry trigger run as separate tasks.
///
/// While an operation is in flight the launcher is checked out of the handle,
/// so an overlapping call (a second click during negotiation) fails with
/// [`XrError::InvalidState`] instead of waiting.
pub struct SharedLauncher<X: XrSystem, U: UiShell> {
    inner: Rc<Shared<X, U>>,
}

struct Shared<X: XrSystem, U: UiShell> {
    slot: RefCell<Option<ArLauncher<X, U>>>,
    /// Last known state, reported while the launcher is checked out.
    state: Cell<ArState>,
}

impl<X: XrSystem, U: UiShell> Clone for SharedLauncher<X, U> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<X: XrSystem, U: UiShell> core::fmt::Debug for SharedLauncher<X, U> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedLauncher")
            .field("state", &self.inner.state.get())
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

impl<X: XrSystem, U: UiShell> SharedLauncher<X, U> {
    /// Creates a launcher whose shell is built by `make_shell`.
    ///
    /// `make_shell` receives a strong handle to the launcher being built,
    /// meant for the entry trigger's handler. The shell then owns the
    /// launcher that owns the shell: the launcher lives as long as the
    /// trigger does, even after every other handle is dropped.
    pub fn launch(system: X, config: ArConfig, make_shell: impl FnOnce(Self) -> U) -> Self {
        let shared = Self {
            inner: Rc::new(Shared {
                slot: RefCell::new(None),
                state: Cell::new(ArState::NoDevice),
            }),
        };
        let shell = make_shell(shared.clone());
        *shared.inner.slot.borrow_mut() = Some(ArLauncher::new(system, shell, config));
        shared
    }

    /// Current negotiation state. While an operation is in flight this is
    /// the state the launcher is moving out of.
    #[must_use]
    pub fn state(&self) -> ArState {
        self.inner.state.get()
    }

    /// Returns `true` while a probe or negotiation is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inner.slot.borrow().is_none()
    }

    /// Runs [`ArLauncher::probe`].
    pub async fn probe(&self, tracer: &mut Tracer<'_>) -> Result<(), XrError> {
        let mut launcher = self.check_out()?;
        let result = launcher.probe(tracer).await;
        self.check_in(launcher);
        result
    }

    /// Runs [`ArLauncher::enter_ar`].
    pub async fn enter_ar(&self, tracer: &mut Tracer<'_>) -> Result<ArSession<X>, XrError> {
        let mut launcher = self.check_out()?;
        if launcher.state() == ArState::DeviceAvailable {
            self.inner.state.set(ArState::SessionRequested);
        }
        let result = launcher.enter_ar(tracer).await;
        self.check_in(launcher);
        result
    }

    fn check_out(&self) -> Result<ArLauncher<X, U>, XrError> {
        let launcher = self.inner.slot.borrow_mut().take();
        launcher.ok_or(XrError::InvalidState(self.inner.state.get()))
    }

    fn check_in(&self, launcher: ArLauncher<X, U>) {
        self.inner.state.set(launcher.state());
        *self.inner.slot.borrow_mut() = Some(launcher);
    }
}

async fn negotiate<X: XrSystem, U: UiShell>(
    system: &X,
    shell: &mut U,
    device: &X::Device,
    config: &ArConfig,
) -> Result<ArSession<X>, XrError> {
    let (surface, output_context) = system.create_output_surface()?;
    let options = SessionOptions {
        output_context,
        environment_integration: config.session.environment_integration,
    };
    let session = system.request_session(device, options).await?;
    system.attach_surface(&surface)?;
    shell.set_state(UiState::Ar);

    let renderer = system.create_renderer(&config.renderer)?;
    system.make_compatible(&renderer, &session).await?;
    let layer = system.create_base_layer(&session, &renderer)?;

    let scene = Scene::cube_grid(&config.scene);
    let camera = Camera::new_tracked();

    let space = system
        .request_frame_of_reference(&session, config.reference)
        .await?;

    Ok(ArSession {
        session,
        surface,
        sync: FrameSync::new(renderer, layer, space, scene, camera),
    })
}
