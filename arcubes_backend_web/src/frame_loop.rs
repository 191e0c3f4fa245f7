// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session frame-callback loop.
//!
//! [`XrFrameLoop`] registers a callback with the session's own
//! `requestAnimationFrame`. Each callback receives the frame timestamp
//! (milliseconds, converted to microsecond [`HostTime`] ticks), the
//! [`XrFrame`], and a [`FrameRequester`] that re-registers the callback.
//!
//! Unlike a window `requestAnimationFrame` loop, this loop does **not**
//! re-register itself: the callback decides, by calling
//! [`FrameRequester::request_frame`]. A callback that never requests stops
//! the loop.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use arcubes_core::platform::FrameRequester;
use arcubes_core::time::HostTime;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;

use crate::bindings::{XrFrame, XrSession};

type FrameClosure = Closure<dyn FnMut(f64, XrFrame)>;
type FrameCallback = Box<dyn FnMut(HostTime, &XrFrame, &mut dyn FrameRequester)>;

/// A session-driven frame loop.
///
/// Create with [`XrFrameLoop::new`], then call [`start`](Self::start) to
/// request the first frame. Dropping the loop cancels the pending request.
pub struct XrFrameLoop {
    inner: Rc<LoopInner>,
}

struct LoopInner {
    session: XrSession,

    /// The JS closure registered with the session. Set once in `start()`
    /// and re-registered from inside itself through [`NextFrame`].
    closure: RefCell<Option<FrameClosure>>,

    callback: RefCell<FrameCallback>,

    running: Cell<bool>,

    /// ID of the most recent request, used to cancel it.
    request_id: Cell<i32>,
}

impl LoopInner {
    fn request(&self) {
        if !self.running.get() {
            return;
        }
        if let Some(ref closure) = *self.closure.borrow() {
            let id = self
                .session
                .request_animation_frame(closure.as_ref().unchecked_ref());
            self.request_id.set(id);
        }
    }
}

/// [`FrameRequester`] handed to each callback invocation.
struct NextFrame<'a> {
    inner: &'a LoopInner,
}

impl FrameRequester for NextFrame<'_> {
    fn request_frame(&mut self) {
        self.inner.request();
    }
}

impl XrFrameLoop {
    /// Creates a loop on `session` that is **not yet running**.
    pub fn new(
        session: XrSession,
        callback: impl FnMut(HostTime, &XrFrame, &mut dyn FrameRequester) + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(LoopInner {
                session,
                closure: RefCell::new(None),
                callback: RefCell::new(Box::new(callback)),
                running: Cell::new(false),
                request_id: Cell::new(0),
            }),
        }
    }

    /// Requests the first frame.
    ///
    /// If already running, this is a no-op.
    pub fn start(&self) {
        if self.inner.running.get() {
            return;
        }
        self.inner.running.set(true);

        let inner = Rc::clone(&self.inner);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64, frame: XrFrame| {
            if !inner.running.get() {
                return;
            }
            let time = HostTime::from_millis_f64(timestamp_ms);
            let mut next = NextFrame { inner: &inner };
            inner.callback.borrow_mut()(time, &frame, &mut next);
        }) as Box<dyn FnMut(f64, XrFrame)>);

        *self.inner.closure.borrow_mut() = Some(closure);
        self.inner.request();
    }
}

impl Drop for XrFrameLoop {
    fn drop(&mut self) {
        if self.inner.running.replace(false) {
            self.inner
                .session
                .cancel_animation_frame(self.inner.request_id.get());
        }
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for XrFrameLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("XrFrameLoop")
            .field("running", &self.inner.running.get())
            .finish_non_exhaustive()
    }
}
