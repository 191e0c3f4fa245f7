// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pose-to-camera frame synchronization for an augmented-reality cube demo.
//!
//! `arcubes_core` holds everything that does not touch a browser: the math,
//! the camera and scene model, the platform contracts, the negotiation state
//! machine and the per-frame loop. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   XrSystem::request_device ──► ArLauncher::probe ──► UiShell::enable_entry
//!                                                            │ (click)
//!                 ┌──────────────────────────────────────────┘
//!                 ▼
//!   ArLauncher::enter_ar ──► session ─► renderer ─► base layer ─► eye-level space
//!                                                            │
//!                 ┌──────────────────────────────────────────┘
//!                 ▼
//!   XrFrame ──► FrameSync::on_frame ──► Renderer (per view)
//!                    │
//!                    └──► FrameRequester::request_frame (first, every frame)
//! ```
//!
//! **[`platform`]**: Traits for the device/session API, the renderer and the
//! DOM shell. Backends implement them; the harness scripts them.
//!
//! **[`session`]**: [`ArLauncher`](session::ArLauncher), the capability probe
//! and session negotiation as one linear async sequence.
//!
//! **[`sync`]**: [`FrameSync`](sync::FrameSync), the per-frame loop.
//!
//! **[`camera`]**: Camera whose matrices are written explicitly each view.
//!
//! **[`scene`]**: The static grid of colored cubes.
//!
//! **[`transform`]**: Column-major 4×4 transform with inversion.
//!
//! **[`config`]**, **[`error`]**, **[`time`]**: Presets, the error taxonomy
//! and frame timestamps.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! negotiation and frame-loop instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod camera;
pub mod config;
pub mod error;
pub mod platform;
pub mod scene;
pub mod session;
pub mod sync;
pub mod time;
pub mod trace;
pub mod transform;
