// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console trace output.

use alloc::format;
use alloc::string::String;

use arcubes_core::trace::{
    FrameEvent, FrameSkipEvent, FrameSummary, NegotiationErrorEvent, SkipReason,
    StateTransitionEvent, TraceSink, ViewRenderEvent,
};
use wasm_bindgen::JsValue;
use web_sys::console;

/// Writes trace events to the browser console.
///
/// Negotiation events always go out. Per-frame events are noisy at 60 Hz, so
/// by default only skips are logged; [`verbose`](Self::verbose) adds frames,
/// views and summaries.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink {
    verbose: bool,
}

impl ConsoleSink {
    /// Logs negotiation events and frame skips.
    #[must_use]
    pub const fn new() -> Self {
        Self { verbose: false }
    }

    /// Logs every event.
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }
}

fn log(line: &str) {
    console::log_1(&JsValue::from_str(line));
}

pub(crate) fn skip_line(e: &FrameSkipEvent) -> String {
    match e.reason {
        SkipReason::PoseLost => format!("[skip] frame={} pose lost", e.frame_index),
        SkipReason::NoViewport { view_index } => {
            format!("[skip] frame={} view={view_index} no viewport", e.frame_index)
        }
        SkipReason::SingularViewMatrix { view_index } => format!(
            "[skip] frame={} view={view_index} singular view matrix",
            e.frame_index
        ),
        SkipReason::RenderFailed { view_index } => {
            format!("[skip] frame={} view={view_index} render failed", e.frame_index)
        }
    }
}

impl TraceSink for ConsoleSink {
    fn on_frame(&mut self, e: &FrameEvent) {
        if self.verbose {
            log(&format!(
                "[frame] frame={} t={:.3}ms views={} pose={}",
                e.frame_index,
                e.time.as_millis_f64(),
                e.view_count,
                e.pose_present,
            ));
        }
    }

    fn on_view_render(&mut self, e: &ViewRenderEvent) {
        if self.verbose {
            let vp = e.viewport;
            log(&format!(
                "[view] frame={} view={} eye={:?} viewport={},{} {}x{}",
                e.frame_index, e.view_index, e.eye, vp.x, vp.y, vp.width, vp.height,
            ));
        }
    }

    fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
        log(&skip_line(e));
    }

    fn on_state_transition(&mut self, e: &StateTransitionEvent) {
        log(&format!("[state] {:?} -> {:?}", e.from, e.to));
    }

    fn on_negotiation_error(&mut self, e: &NegotiationErrorEvent) {
        console::warn_1(&JsValue::from_str(&format!(
            "[error] in {:?}: {}",
            e.state, e.error
        )));
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        if self.verbose {
            log(&format!(
                "[summary] frame={} rendered={}/{}",
                s.frame_index, s.views_rendered, s.views_delivered,
            ));
        }
    }
}
