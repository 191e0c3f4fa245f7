// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Negotiation errors.
//!
//! Every variant leads to the same user-visible outcome, the
//! [`UiState::Unsupported`](crate::platform::UiState::Unsupported) class.
//! The variants only differ for diagnostics.

use core::fmt;

use crate::session::ArState;

/// The negotiation step an error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// `navigator.xr.requestDevice()`.
    RequestDevice,
    /// Wiring the "enter AR" trigger.
    EnableEntry,
    /// Creating the output canvas and its presentation context.
    OutputSurface,
    /// `XRDevice.requestSession()`.
    RequestSession,
    /// Attaching the output canvas to the document.
    AttachSurface,
    /// Creating the renderer and its rendering context.
    CreateRenderer,
    /// Making the rendering context compatible with the device.
    MakeCompatible,
    /// Creating the session's base layer.
    CreateBaseLayer,
    /// `XRSession.requestFrameOfReference()`.
    FrameOfReference,
}

impl Step {
    /// Returns a short name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestDevice => "request-device",
            Self::EnableEntry => "enable-entry",
            Self::OutputSurface => "output-surface",
            Self::RequestSession => "request-session",
            Self::AttachSurface => "attach-surface",
            Self::CreateRenderer => "create-renderer",
            Self::MakeCompatible => "make-compatible",
            Self::CreateBaseLayer => "create-base-layer",
            Self::FrameOfReference => "frame-of-reference",
        }
    }
}

/// Errors from capability probing and session negotiation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum XrError {
    /// The platform has no AR capability (API absent or no device).
    Unsupported,
    /// A platform promise rejected.
    Rejected(Step),
    /// A platform call threw synchronously.
    Exception(Step),
    /// The operation is not valid in the current negotiation state.
    InvalidState(ArState),
}

impl XrError {
    /// Returns the step the error came from, if any.
    #[must_use]
    pub const fn step(self) -> Option<Step> {
        match self {
            Self::Rejected(step) | Self::Exception(step) => Some(step),
            Self::Unsupported | Self::InvalidState(_) => None,
        }
    }
}

impl fmt::Display for XrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => write!(f, "AR is not supported on this platform"),
            Self::Rejected(step) => write!(f, "{} was rejected", step.as_str()),
            Self::Exception(step) => write!(f, "{} threw an exception", step.as_str()),
            Self::InvalidState(state) => write!(f, "not allowed in state {state:?}"),
        }
    }
}

impl core::error::Error for XrError {}
