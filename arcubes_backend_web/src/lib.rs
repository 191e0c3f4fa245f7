// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for arcubes.
//!
//! This crate implements the [`arcubes_core::platform`] contracts over the
//! legacy WebXR device API:
//!
//! - [`WebXrSystem`]: device probe and session negotiation
//! - [`XrFrameLoop`]: session `requestAnimationFrame` loop
//! - [`WebGlRenderer`]: WebGL2 cube renderer
//! - [`DomShell`]: body state classes and the "enter AR" trigger
//! - [`ConsoleSink`]: trace output to the browser console
//!
//! The raw API declarations live in [`bindings`].

#![no_std]

extern crate alloc;

pub mod bindings;
mod console;
mod frame_loop;
mod renderer;
mod shell;
mod system;

pub use console::ConsoleSink;
pub use frame_loop::XrFrameLoop;
pub use renderer::{WebGlError, WebGlRenderer};
pub use shell::{DEFAULT_ENTRY_SELECTOR, DomShell};
pub use system::WebXrSystem;

use arcubes_core::session::{ArSession, SharedLauncher};

/// The launcher handle for the browser, shared by the startup task and the
/// "enter AR" click handler.
pub type WebArLauncher = SharedLauncher<WebXrSystem, DomShell>;

/// A negotiated browser session.
pub type WebArSession = ArSession<WebXrSystem>;
