// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bindings for the legacy WebXR device API.
//!
//! `web-sys` only carries the current WebXR API. The device-based API this
//! backend targets (`navigator.xr.requestDevice`, `XRDevice.requestSession`,
//! `requestFrameOfReference`, `getDevicePose`, the `xrpresent` canvas
//! context) is declared here by hand.
//!
//! Methods that return promises or may throw are bound with `catch`, so a
//! synchronous exception surfaces as `Err` instead of a wasm trap.
//!
//! Getters whose natural Rust name would shadow a trait method from
//! [`arcubes_core::platform`] get a distinct Rust name (`view_array`,
//! `eye_name`, ...) and keep the JS property name.

use alloc::string::String;

use js_sys::{Array, Float32Array, Function, Promise};
use wasm_bindgen::prelude::*;
use web_sys::{WebGl2RenderingContext, WebGlFramebuffer};

#[wasm_bindgen]
extern "C" {
    /// `navigator.xr`.
    #[wasm_bindgen(js_name = XR)]
    #[derive(Clone, Debug)]
    pub type Xr;

    /// Resolves with an AR-capable [`XrDevice`].
    #[wasm_bindgen(method, catch, js_name = requestDevice)]
    pub fn request_device(this: &Xr) -> Result<Promise, JsValue>;

    /// An AR-capable device.
    #[wasm_bindgen(js_name = XRDevice)]
    #[derive(Clone, Debug)]
    pub type XrDevice;

    /// Resolves with an [`XrSession`].
    #[wasm_bindgen(method, catch, js_name = requestSession)]
    pub fn request_session(this: &XrDevice, options: &JsValue) -> Result<Promise, JsValue>;

    /// A live AR session.
    #[wasm_bindgen(js_name = XRSession)]
    #[derive(Clone, Debug)]
    pub type XrSession;

    /// The device the session runs on.
    #[wasm_bindgen(method, getter)]
    pub fn device(this: &XrSession) -> XrDevice;

    /// Installs the layer the session composites from.
    #[wasm_bindgen(method, setter = baseLayer)]
    pub fn set_base_layer(this: &XrSession, layer: &XrWebGlLayer);

    /// Resolves with an [`XrFrameOfReference`].
    #[wasm_bindgen(method, catch, js_name = requestFrameOfReference)]
    pub fn request_frame_of_reference(this: &XrSession, kind: &str) -> Result<Promise, JsValue>;

    /// Schedules `callback(time, frame)` for the next session frame.
    #[wasm_bindgen(method, js_name = requestAnimationFrame)]
    pub fn request_animation_frame(this: &XrSession, callback: &Function) -> i32;

    /// Cancels a pending frame request.
    #[wasm_bindgen(method, js_name = cancelAnimationFrame)]
    pub fn cancel_animation_frame(this: &XrSession, id: i32);

    /// A named coordinate space.
    #[wasm_bindgen(js_name = XRFrameOfReference)]
    #[derive(Clone, Debug)]
    pub type XrFrameOfReference;

    /// Data handed to a session frame callback.
    #[wasm_bindgen(js_name = XRFrame)]
    #[derive(Clone, Debug)]
    pub type XrFrame;

    /// `frame.views`.
    #[wasm_bindgen(method, getter = views)]
    pub fn view_array(this: &XrFrame) -> Array;

    /// `frame.getDevicePose(frameOfReference)`; `null` while tracking is
    /// lost.
    #[wasm_bindgen(method, js_name = getDevicePose)]
    pub fn get_device_pose(this: &XrFrame, reference: &XrFrameOfReference) -> Option<XrDevicePose>;

    /// One view of a frame.
    #[wasm_bindgen(js_name = XRView)]
    #[derive(Clone, Debug)]
    pub type XrView;

    /// `"left"`, `"right"` or `"none"`.
    #[wasm_bindgen(method, getter = eye)]
    pub fn eye_name(this: &XrView) -> String;

    /// Column-major 4×4 projection.
    #[wasm_bindgen(method, getter = projectionMatrix)]
    pub fn projection_array(this: &XrView) -> Float32Array;

    /// A device pose for one frame.
    #[wasm_bindgen(js_name = XRDevicePose)]
    #[derive(Clone, Debug)]
    pub type XrDevicePose;

    /// Column-major 4×4 world-to-view matrix for `view`.
    #[wasm_bindgen(method, js_name = getViewMatrix)]
    pub fn get_view_matrix(this: &XrDevicePose, view: &XrView) -> Float32Array;

    /// A WebGL-backed session layer.
    #[wasm_bindgen(js_name = XRWebGLLayer)]
    #[derive(Clone, Debug)]
    pub type XrWebGlLayer;

    /// `new XRWebGLLayer(session, context)`.
    #[wasm_bindgen(constructor, catch)]
    pub fn new(
        session: &XrSession,
        context: &WebGl2RenderingContext,
    ) -> Result<XrWebGlLayer, JsValue>;

    /// The framebuffer to draw into; `null` means the default one.
    #[wasm_bindgen(method, getter = framebuffer)]
    pub fn gl_framebuffer(this: &XrWebGlLayer) -> Option<WebGlFramebuffer>;

    /// The region of the framebuffer belonging to `view`.
    #[wasm_bindgen(method, js_name = getViewport)]
    pub fn get_viewport(this: &XrWebGlLayer, view: &XrView) -> Option<XrViewport>;

    /// An integer pixel rectangle.
    #[wasm_bindgen(js_name = XRViewport)]
    #[derive(Clone, Debug)]
    pub type XrViewport;

    /// Left edge.
    #[wasm_bindgen(method, getter)]
    pub fn x(this: &XrViewport) -> i32;

    /// Bottom edge.
    #[wasm_bindgen(method, getter)]
    pub fn y(this: &XrViewport) -> i32;

    /// Width in pixels.
    #[wasm_bindgen(method, getter)]
    pub fn width(this: &XrViewport) -> i32;

    /// Height in pixels.
    #[wasm_bindgen(method, getter)]
    pub fn height(this: &XrViewport) -> i32;

    /// The `xrpresent` canvas context a session composites into.
    #[wasm_bindgen(js_name = XRPresentationContext)]
    #[derive(Clone, Debug)]
    pub type XrPresentationContext;

    /// A WebGL2 context viewed through its legacy XR extension method.
    #[wasm_bindgen(extends = WebGl2RenderingContext, js_name = WebGL2RenderingContext)]
    #[derive(Clone, Debug)]
    pub type XrCompatibleContext;

    /// Resolves once the context can render for `device`.
    #[wasm_bindgen(method, catch, js_name = setCompatibleXRDevice)]
    pub fn set_compatible_xr_device(
        this: &XrCompatibleContext,
        device: &XrDevice,
    ) -> Result<Promise, JsValue>;
}

/// Copies up to 16 values of a matrix array. Missing entries stay zero.
pub(crate) fn matrix_from_array(array: &Float32Array) -> [f32; 16] {
    let mut out = [0.0; 16];
    for (slot, i) in out.iter_mut().zip(0..array.length()) {
        *slot = array.get_index(i);
    }
    out
}
