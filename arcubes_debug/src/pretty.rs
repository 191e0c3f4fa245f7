// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Frame
//! timestamps are printed in milliseconds.

use std::io::Write;

use arcubes_core::platform::Eye;
use arcubes_core::trace::{
    FrameEvent, FrameSkipEvent, FrameSummary, NegotiationErrorEvent, SkipReason,
    StateTransitionEvent, TraceSink, ViewRenderEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn eye_name(eye: Eye) -> &'static str {
    match eye {
        Eye::Left => "left",
        Eye::Right => "right",
        Eye::None => "none",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame(&mut self, e: &FrameEvent) {
        let pose = if e.pose_present { "tracked" } else { "LOST" };
        let _ = writeln!(
            self.writer,
            "[frame] frame={} t={:.3}ms views={} pose={pose}",
            e.frame_index,
            e.time.as_millis_f64(),
            e.view_count,
        );
    }

    fn on_view_render(&mut self, e: &ViewRenderEvent) {
        let vp = e.viewport;
        let _ = writeln!(
            self.writer,
            "[view] frame={} view={} eye={} viewport=({}, {}) {}x{}",
            e.frame_index,
            e.view_index,
            eye_name(e.eye),
            vp.x,
            vp.y,
            vp.width,
            vp.height,
        );
    }

    fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
        let _ = match e.reason {
            SkipReason::PoseLost => writeln!(self.writer, "[skip] frame={} pose lost", e.frame_index),
            SkipReason::NoViewport { view_index } => writeln!(
                self.writer,
                "[skip] frame={} view={view_index} no viewport",
                e.frame_index,
            ),
            SkipReason::SingularViewMatrix { view_index } => writeln!(
                self.writer,
                "[skip] frame={} view={view_index} singular view matrix",
                e.frame_index,
            ),
            SkipReason::RenderFailed { view_index } => writeln!(
                self.writer,
                "[skip] frame={} view={view_index} render failed",
                e.frame_index,
            ),
        };
    }

    fn on_state_transition(&mut self, e: &StateTransitionEvent) {
        let _ = writeln!(self.writer, "[state] {:?} -> {:?}", e.from, e.to);
    }

    fn on_negotiation_error(&mut self, e: &NegotiationErrorEvent) {
        let _ = writeln!(self.writer, "[error] state={:?} {}", e.state, e.error);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} rendered={}/{}",
            s.frame_index, s.views_rendered, s.views_delivered,
        );
    }
}
