// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted AR session that exercises the tracing and diagnostics pipeline.
//!
//! Negotiates a session against the scripted platform, then runs stereo,
//! pose-lost and render-failure frames through it. Every event goes to both a
//! [`PrettyPrintSink`](arcubes_debug::pretty::PrettyPrintSink) on stdout and a
//! [`JsonLinesSink`](arcubes_debug::json::JsonLinesSink) that is written to
//! `trace.jsonl`.

use std::fs::File;
use std::io::BufWriter;

use arcubes_core::error::Step;
use arcubes_core::time::HostTime;
use arcubes_core::trace::{
    FrameEvent, FrameSkipEvent, FrameSummary, NegotiationErrorEvent, StateTransitionEvent,
    TraceSink, Tracer, ViewRenderEvent,
};
use arcubes_harness::{RecordingRequester, Script, ScriptedFrame, scripted_launcher};

use arcubes_debug::json::JsonLinesSink;
use arcubes_debug::pretty::PrettyPrintSink;

/// Frame interval in microsecond ticks (≈60 Hz).
const FRAME_INTERVAL: u64 = 16_667;

/// Forwards every event to both sinks.
struct Both<'a> {
    pretty: &'a mut dyn TraceSink,
    json: &'a mut dyn TraceSink,
}

impl TraceSink for Both<'_> {
    fn on_frame(&mut self, e: &FrameEvent) {
        self.pretty.on_frame(e);
        self.json.on_frame(e);
    }

    fn on_view_render(&mut self, e: &ViewRenderEvent) {
        self.pretty.on_view_render(e);
        self.json.on_view_render(e);
    }

    fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
        self.pretty.on_frame_skip(e);
        self.json.on_frame_skip(e);
    }

    fn on_state_transition(&mut self, e: &StateTransitionEvent) {
        self.pretty.on_state_transition(e);
        self.json.on_state_transition(e);
    }

    fn on_negotiation_error(&mut self, e: &NegotiationErrorEvent) {
        self.pretty.on_negotiation_error(e);
        self.json.on_negotiation_error(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.pretty.on_frame_summary(s);
        self.json.on_frame_summary(s);
    }
}

fn main() {
    // -- sinks --------------------------------------------------------------
    let path = "trace.jsonl";
    let file = File::create(path).expect("failed to create trace.jsonl");
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut json = JsonLinesSink::new(BufWriter::new(file));
    let mut both = Both {
        pretty: &mut pretty,
        json: &mut json,
    };
    let mut tracer = Tracer::new(&mut both);

    // -- a negotiation that fails -------------------------------------------
    let (mut launcher, _) = scripted_launcher(Script::rejecting(Step::RequestSession));
    pollster::block_on(launcher.probe(&mut tracer)).expect("the device query succeeds");
    let _ = pollster::block_on(launcher.enter_ar(&mut tracer));

    // -- a session with a failing render call -------------------------------
    let (mut launcher, log) = scripted_launcher(Script {
        fail_render_at: Some(5),
        ..Script::ok()
    });
    pollster::block_on(launcher.probe(&mut tracer)).expect("the device query succeeds");
    let mut session =
        pollster::block_on(launcher.enter_ar(&mut tracer)).expect("negotiation succeeds");
    let mut requester = RecordingRequester::new(log);

    // Two stereo frames, a frame without a pose, then the render failure on
    // the second view of the next frame and a recovered frame after it.
    let frames = [
        ScriptedFrame::stereo(),
        ScriptedFrame::stereo(),
        ScriptedFrame::stereo().without_pose(),
        ScriptedFrame::stereo(),
        ScriptedFrame::stereo(),
    ];
    let mut now = 0;
    for frame in &frames {
        let outcome = session
            .sync
            .on_frame(HostTime(now), frame, &mut requester, &mut tracer);
        println!("  -> {outcome:?}");
        now += FRAME_INTERVAL;
    }

    drop(tracer);
    println!(
        "Wrote {path} ({} frames, {} frame requests)",
        frames.len(),
        requester.requests()
    );
}
