// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for negotiation and the frame loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! launcher and the frame synchronizer call at each stage. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::error::XrError;
use crate::platform::{Eye, Viewport};
use crate::session::ArState;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why a frame (or one of its views) produced no output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// No device pose this frame; nothing was rendered.
    PoseLost,
    /// The base layer had no viewport for the view.
    NoViewport {
        /// Index of the skipped view.
        view_index: u32,
    },
    /// The pose's view matrix for the view could not be inverted.
    SingularViewMatrix {
        /// Index of the skipped view.
        view_index: u32,
    },
    /// The renderer reported an error; remaining views were abandoned.
    RenderFailed {
        /// Index of the failed view.
        view_index: u32,
    },
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the session delivers a frame, after the next frame was
/// requested.
#[derive(Clone, Copy, Debug)]
pub struct FrameEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Frame timestamp.
    pub time: HostTime,
    /// Number of views the frame carries.
    pub view_count: u32,
    /// Whether a device pose was available.
    pub pose_present: bool,
}

/// Emitted right before a view is rendered.
#[derive(Clone, Copy, Debug)]
pub struct ViewRenderEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Position of the view in the frame's view list.
    pub view_index: u32,
    /// Eye the view belongs to.
    pub eye: Eye,
    /// Viewport the renderer was resized to.
    pub viewport: Viewport,
}

/// Emitted when a frame or a view is skipped.
#[derive(Clone, Copy, Debug)]
pub struct FrameSkipEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Why output was skipped.
    pub reason: SkipReason,
}

/// Emitted when the negotiation state machine moves.
#[derive(Clone, Copy, Debug)]
pub struct StateTransitionEvent {
    /// Previous state.
    pub from: ArState,
    /// New state.
    pub to: ArState,
}

/// Emitted when a probe or negotiation step fails.
#[derive(Clone, Copy, Debug)]
pub struct NegotiationErrorEvent {
    /// State the launcher was in when the step failed.
    pub state: ArState,
    /// The failure.
    pub error: XrError,
}

/// Per-frame summary emitted at the end of every frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Frame timestamp.
    pub time: HostTime,
    /// Views the frame carried.
    pub views_delivered: u32,
    /// Views that were rendered.
    pub views_rendered: u32,
    /// Whether a device pose was available.
    pub pose_present: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a frame is delivered.
    fn on_frame(&mut self, e: &FrameEvent) {
        _ = e;
    }

    /// Called before each view is rendered.
    fn on_view_render(&mut self, e: &ViewRenderEvent) {
        _ = e;
    }

    /// Called when a frame or view is skipped.
    fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
        _ = e;
    }

    /// Called on every negotiation state change.
    fn on_state_transition(&mut self, e: &StateTransitionEvent) {
        _ = e;
    }

    /// Called when a probe or negotiation step fails.
    fn on_negotiation_error(&mut self, e: &NegotiationErrorEvent) {
        _ = e;
    }

    /// Called with a per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameEvent`].
    #[inline]
    pub fn frame(&mut self, e: &FrameEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ViewRenderEvent`].
    #[inline]
    pub fn view_render(&mut self, e: &ViewRenderEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_view_render(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSkipEvent`].
    #[inline]
    pub fn frame_skip(&mut self, e: &FrameSkipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_skip(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`StateTransitionEvent`].
    #[inline]
    pub fn state_transition(&mut self, e: &StateTransitionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_state_transition(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NegotiationErrorEvent`].
    #[inline]
    pub fn negotiation_error(&mut self, e: &NegotiationErrorEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_negotiation_error(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> FrameEvent {
        FrameEvent {
            frame_index: 42,
            time: HostTime(1_000_000),
            view_count: 2,
            pose_present: true,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_frame(&sample_frame());
        sink.on_frame_skip(&FrameSkipEvent {
            frame_index: 0,
            reason: SkipReason::PoseLost,
        });
        sink.on_frame_summary(&FrameSummary {
            frame_index: 0,
            time: HostTime(0),
            views_delivered: 1,
            views_rendered: 0,
            pose_present: false,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.frame(&sample_frame());
        tracer.state_transition(&StateTransitionEvent {
            from: ArState::NoDevice,
            to: ArState::Unsupported,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            frames: Vec<u64>,
            transitions: Vec<ArState>,
        }
        impl TraceSink for RecordingSink {
            fn on_frame(&mut self, e: &FrameEvent) {
                self.frames.push(e.frame_index);
            }
            fn on_state_transition(&mut self, e: &StateTransitionEvent) {
                self.transitions.push(e.to);
            }
        }

        let mut sink = RecordingSink {
            frames: Vec::new(),
            transitions: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.frame(&sample_frame());
        tracer.state_transition(&StateTransitionEvent {
            from: ArState::NoDevice,
            to: ArState::DeviceAvailable,
        });
        drop(tracer);
        assert_eq!(sink.frames, &[42]);
        assert_eq!(sink.transitions, &[ArState::DeviceAvailable]);
    }
}
