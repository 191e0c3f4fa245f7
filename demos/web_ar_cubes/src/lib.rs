// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web demo: a 4×4×4 grid of colored cubes around the viewer, rendered
//! through the device's AR session.
//!
//! On load the page probes for an AR-capable device. If one is found the
//! `#enter-ar` button is wired; clicking it negotiates a session, after which
//! every session frame renders the grid once per view. Without a device the
//! body gets the `unsupported` class.
//!
//! Build with: `wasm-pack build --target web demos/web_ar_cubes`
//!
//! Then serve `demos/web_ar_cubes/` and open `index.html` in a browser that
//! exposes the device API.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use arcubes_backend_web::{
    ConsoleSink, DEFAULT_ENTRY_SELECTOR, DomShell, WebArLauncher, WebArSession, WebXrSystem,
    XrFrameLoop,
};
use arcubes_core::config::ArConfig;
use arcubes_core::session::ArSession;
use arcubes_core::trace::Tracer;

/// Entry point, called by `wasm_bindgen(start)`.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    let system = WebXrSystem::new().map_err(|e| JsValue::from_str(&alloc::format!("{e}")))?;
    let document = system.document().clone();

    // The click handler holds a strong handle, so the launcher lives as long
    // as the page does.
    let launcher = WebArLauncher::launch(system, ArConfig::web(), |handle| {
        DomShell::new(document, DEFAULT_ENTRY_SELECTOR, move || {
            enter(handle.clone());
        })
    });

    // The outcome is visible through the body class.
    spawn_local(async move {
        let mut sink = ConsoleSink::new();
        let _ = launcher.probe(&mut Tracer::new(&mut sink)).await;
    });
    Ok(())
}

/// Negotiates a session and starts rendering it.
///
/// A click while a negotiation is in flight finds the launcher busy and is
/// ignored.
fn enter(launcher: WebArLauncher) {
    spawn_local(async move {
        let mut sink = ConsoleSink::new();
        if let Ok(session) = launcher.enter_ar(&mut Tracer::new(&mut sink)).await {
            run(session);
        }
    });
}

/// Drives `session` for as long as the page lives.
fn run(session: WebArSession) {
    // The output surface stays attached to the document on its own.
    let ArSession {
        session, mut sync, ..
    } = session;
    let mut sink = ConsoleSink::new();

    let frame_loop = XrFrameLoop::new(session, move |time, frame, requester| {
        let _ = sync.on_frame(time, frame, requester, &mut Tracer::new(&mut sink));
    });
    frame_loop.start();

    // The session ends with the page.
    core::mem::forget(frame_loop);
}
