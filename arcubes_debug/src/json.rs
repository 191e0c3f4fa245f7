// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON Lines trace export.
//!
//! [`JsonLinesSink`] writes one JSON object per event, one per line. Every
//! object carries an `"event"` tag naming the event kind; times are in
//! microsecond ticks (`"time_us"`).

use std::io::Write;

use serde_json::{Value, json};

use arcubes_core::error::XrError;
use arcubes_core::trace::{
    FrameEvent, FrameSkipEvent, FrameSummary, NegotiationErrorEvent, SkipReason,
    StateTransitionEvent, TraceSink, ViewRenderEvent,
};

/// Writes trace events as JSON Lines.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink").finish_non_exhaustive()
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink that writes to `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, value: &Value) {
        let _ = writeln!(self.writer, "{value}");
    }
}

fn skip_reason(reason: SkipReason) -> Value {
    match reason {
        SkipReason::PoseLost => json!({ "kind": "pose_lost" }),
        SkipReason::NoViewport { view_index } => {
            json!({ "kind": "no_viewport", "view_index": view_index })
        }
        SkipReason::SingularViewMatrix { view_index } => {
            json!({ "kind": "singular_view_matrix", "view_index": view_index })
        }
        SkipReason::RenderFailed { view_index } => {
            json!({ "kind": "render_failed", "view_index": view_index })
        }
    }
}

fn error_value(error: XrError) -> Value {
    json!({
        "message": error.to_string(),
        "step": error.step().map(|step| step.as_str()),
    })
}

impl<W: Write> TraceSink for JsonLinesSink<W> {
    fn on_frame(&mut self, e: &FrameEvent) {
        self.emit(&json!({
            "event": "frame",
            "frame_index": e.frame_index,
            "time_us": e.time.ticks(),
            "view_count": e.view_count,
            "pose_present": e.pose_present,
        }));
    }

    fn on_view_render(&mut self, e: &ViewRenderEvent) {
        let vp = e.viewport;
        self.emit(&json!({
            "event": "view_render",
            "frame_index": e.frame_index,
            "view_index": e.view_index,
            "eye": format!("{:?}", e.eye),
            "viewport": [vp.x, vp.y, vp.width, vp.height],
        }));
    }

    fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
        self.emit(&json!({
            "event": "frame_skip",
            "frame_index": e.frame_index,
            "reason": skip_reason(e.reason),
        }));
    }

    fn on_state_transition(&mut self, e: &StateTransitionEvent) {
        self.emit(&json!({
            "event": "state_transition",
            "from": format!("{:?}", e.from),
            "to": format!("{:?}", e.to),
        }));
    }

    fn on_negotiation_error(&mut self, e: &NegotiationErrorEvent) {
        self.emit(&json!({
            "event": "negotiation_error",
            "state": format!("{:?}", e.state),
            "error": error_value(e.error),
        }));
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.emit(&json!({
            "event": "frame_summary",
            "frame_index": s.frame_index,
            "time_us": s.time.ticks(),
            "views_delivered": s.views_delivered,
            "views_rendered": s.views_rendered,
            "pose_present": s.pose_present,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcubes_core::error::Step;
    use arcubes_core::session::ArState;
    use arcubes_core::time::HostTime;

    fn lines(sink: JsonLinesSink<Vec<u8>>) -> Vec<Value> {
        let output = String::from_utf8(sink.into_inner()).unwrap();
        output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn each_event_is_one_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.on_state_transition(&StateTransitionEvent {
            from: ArState::NoDevice,
            to: ArState::DeviceAvailable,
        });
        sink.on_frame_skip(&FrameSkipEvent {
            frame_index: 9,
            reason: SkipReason::NoViewport { view_index: 1 },
        });
        sink.on_frame_summary(&FrameSummary {
            frame_index: 9,
            time: HostTime(150_000),
            views_delivered: 2,
            views_rendered: 1,
            pose_present: true,
        });

        let values = lines(sink);
        assert_eq!(values.len(), 3, "one object per event");
        assert_eq!(values[0]["event"], "state_transition");
        assert_eq!(values[0]["to"], "DeviceAvailable");
        assert_eq!(values[1]["reason"]["kind"], "no_viewport");
        assert_eq!(values[1]["reason"]["view_index"], 1);
        assert_eq!(values[2]["time_us"], 150_000);
        assert_eq!(values[2]["views_rendered"], 1);
    }

    #[test]
    fn negotiation_error_carries_step() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.on_negotiation_error(&NegotiationErrorEvent {
            state: ArState::SessionRequested,
            error: XrError::Rejected(Step::FrameOfReference),
        });
        sink.on_negotiation_error(&NegotiationErrorEvent {
            state: ArState::NoDevice,
            error: XrError::Unsupported,
        });

        let values = lines(sink);
        assert_eq!(values[0]["error"]["step"], "frame-of-reference");
        assert_eq!(values[1]["error"]["step"], Value::Null);
        assert_eq!(
            values[1]["error"]["message"],
            "AR is not supported on this platform"
        );
    }
}
