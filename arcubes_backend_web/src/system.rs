// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`XrSystem`] and per-frame trait implementations over the legacy WebXR
//! device API.
//!
//! Each negotiation step performs its synchronous platform call eagerly and
//! returns a future that awaits the resulting promise. A synchronous throw
//! maps to [`XrError::Exception`], a rejected promise to
//! [`XrError::Rejected`], and a missing capability (no `navigator.xr`, no
//! `xrpresent` context, a `null` device) to [`XrError::Unsupported`].

use alloc::vec::Vec;
use core::future::Future;

use arcubes_core::config::{FrameOfReferenceKind, RendererParams, SessionOptions};
use arcubes_core::error::{Step, XrError};
use arcubes_core::platform::{self as xr, Eye, Viewport};
use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlCanvasElement, WebGlFramebuffer, Window};

use crate::bindings::{
    self, Xr, XrCompatibleContext, XrDevice, XrDevicePose, XrFrame, XrFrameOfReference,
    XrPresentationContext, XrSession, XrView, XrWebGlLayer,
};
use crate::renderer::WebGlRenderer;

/// The browser as an [`XrSystem`](xr::XrSystem).
#[derive(Clone, Debug)]
pub struct WebXrSystem {
    window: Window,
    document: Document,
}

impl WebXrSystem {
    /// Captures the global window and document.
    ///
    /// Outside a browser document this fails with
    /// [`XrError::Unsupported`].
    pub fn new() -> Result<Self, XrError> {
        let window = web_sys::window().ok_or(XrError::Unsupported)?;
        let document = window.document().ok_or(XrError::Unsupported)?;
        Ok(Self { window, document })
    }

    /// The document sessions attach their output surface to.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns `navigator.xr`, or [`XrError::Unsupported`] when the API is
    /// absent.
    fn xr(&self) -> Result<Xr, XrError> {
        let navigator = self.window.navigator();
        let xr = Reflect::get(&navigator, &JsValue::from_str("xr"))
            .map_err(|_| XrError::Exception(Step::RequestDevice))?;
        if xr.is_undefined() || xr.is_null() {
            return Err(XrError::Unsupported);
        }
        Ok(xr.unchecked_into())
    }
}

/// Awaits `promise`, mapping a rejection to [`XrError::Rejected`].
async fn settle(promise: Result<Promise, XrError>, step: Step) -> Result<JsValue, XrError> {
    JsFuture::from(promise?)
        .await
        .map_err(|_| XrError::Rejected(step))
}

fn set(target: &Object, key: &str, value: &JsValue, step: Step) -> Result<(), XrError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(drop)
        .map_err(|_| XrError::Exception(step))
}

impl xr::XrSystem for WebXrSystem {
    type Device = XrDevice;
    type Session = XrSession;
    type Surface = HtmlCanvasElement;
    type OutputContext = XrPresentationContext;
    type Renderer = WebGlRenderer;
    type Layer = XrWebGlLayer;
    type Space = XrFrameOfReference;

    fn request_device(&self) -> impl Future<Output = Result<XrDevice, XrError>> {
        let promise = self.xr().and_then(|xr| {
            xr.request_device()
                .map_err(|_| XrError::Exception(Step::RequestDevice))
        });
        async move {
            let device = settle(promise, Step::RequestDevice).await?;
            if device.is_undefined() || device.is_null() {
                return Err(XrError::Unsupported);
            }
            Ok(device.unchecked_into())
        }
    }

    fn create_output_surface(&self) -> Result<(HtmlCanvasElement, XrPresentationContext), XrError> {
        let canvas: HtmlCanvasElement = self
            .document
            .create_element("canvas")
            .map_err(|_| XrError::Exception(Step::OutputSurface))?
            .unchecked_into();
        let context = canvas
            .get_context("xrpresent")
            .map_err(|_| XrError::Exception(Step::OutputSurface))?
            .ok_or(XrError::Unsupported)?;
        Ok((canvas, context.unchecked_into()))
    }

    fn request_session(
        &self,
        device: &XrDevice,
        options: SessionOptions<XrPresentationContext>,
    ) -> impl Future<Output = Result<XrSession, XrError>> {
        let promise = session_options(&options).and_then(|js_options| {
            device
                .request_session(&js_options)
                .map_err(|_| XrError::Exception(Step::RequestSession))
        });
        async move {
            let session = settle(promise, Step::RequestSession).await?;
            Ok(session.unchecked_into())
        }
    }

    fn attach_surface(&self, surface: &HtmlCanvasElement) -> Result<(), XrError> {
        let body = self
            .document
            .body()
            .ok_or(XrError::Exception(Step::AttachSurface))?;
        body.append_child(surface)
            .map(drop)
            .map_err(|_| XrError::Exception(Step::AttachSurface))
    }

    fn create_renderer(&self, params: &RendererParams) -> Result<WebGlRenderer, XrError> {
        WebGlRenderer::new(&self.document, params)
            .map_err(|_| XrError::Exception(Step::CreateRenderer))
    }

    fn make_compatible(
        &self,
        renderer: &WebGlRenderer,
        session: &XrSession,
    ) -> impl Future<Output = Result<(), XrError>> {
        let context: &XrCompatibleContext = renderer.context().unchecked_ref();
        let promise = context
            .set_compatible_xr_device(&session.device())
            .map_err(|_| XrError::Exception(Step::MakeCompatible));
        async move {
            settle(promise, Step::MakeCompatible).await?;
            Ok(())
        }
    }

    fn create_base_layer(
        &self,
        session: &XrSession,
        renderer: &WebGlRenderer,
    ) -> Result<XrWebGlLayer, XrError> {
        let layer = XrWebGlLayer::new(session, renderer.context())
            .map_err(|_| XrError::Exception(Step::CreateBaseLayer))?;
        session.set_base_layer(&layer);
        Ok(layer)
    }

    fn request_frame_of_reference(
        &self,
        session: &XrSession,
        kind: FrameOfReferenceKind,
    ) -> impl Future<Output = Result<XrFrameOfReference, XrError>> {
        let promise = session
            .request_frame_of_reference(kind.as_str())
            .map_err(|_| XrError::Exception(Step::FrameOfReference));
        async move {
            let space = settle(promise, Step::FrameOfReference).await?;
            Ok(space.unchecked_into())
        }
    }
}

fn session_options(options: &SessionOptions<XrPresentationContext>) -> Result<Object, XrError> {
    let js = Object::new();
    set(
        &js,
        "outputContext",
        &options.output_context,
        Step::RequestSession,
    )?;
    set(
        &js,
        "environmentIntegration",
        &JsValue::from_bool(options.environment_integration),
        Step::RequestSession,
    )?;
    Ok(js)
}

/// Maps the `eye` property of a view.
pub(crate) fn eye_from_name(name: &str) -> Eye {
    match name {
        "left" => Eye::Left,
        "right" => Eye::Right,
        _ => Eye::None,
    }
}

impl xr::XrView for XrView {
    fn eye(&self) -> Eye {
        eye_from_name(&self.eye_name())
    }

    fn projection_matrix(&self) -> [f32; 16] {
        bindings::matrix_from_array(&self.projection_array())
    }
}

impl xr::DevicePose<XrView> for XrDevicePose {
    fn view_matrix(&self, view: &XrView) -> [f32; 16] {
        bindings::matrix_from_array(&self.get_view_matrix(view))
    }
}

impl xr::XrFrame for XrFrame {
    type Space = XrFrameOfReference;
    type View = XrView;
    type Pose = XrDevicePose;

    fn views(&self) -> Vec<XrView> {
        self.view_array()
            .iter()
            .map(JsCast::unchecked_into)
            .collect()
    }

    fn device_pose(&self, space: &XrFrameOfReference) -> Option<XrDevicePose> {
        self.get_device_pose(space)
    }
}

impl xr::BaseLayer<XrView> for XrWebGlLayer {
    type Framebuffer = WebGlFramebuffer;

    fn framebuffer(&self) -> Option<WebGlFramebuffer> {
        self.gl_framebuffer()
    }

    fn viewport(&self, view: &XrView) -> Option<Viewport> {
        let vp = self.get_viewport(view)?;
        Some(Viewport::new(
            vp.x(),
            vp.y(),
            u32::try_from(vp.width()).unwrap_or(0),
            u32::try_from(vp.height()).unwrap_or(0),
        ))
    }
}
