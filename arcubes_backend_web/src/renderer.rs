// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! WebGL2 renderer for the cube scene.
//!
//! [`WebGlRenderer`] owns a canvas and a WebGL2 context, one shader program
//! and one unit-cube vertex buffer. Every mesh is drawn as the same 36
//! vertices, scaled and placed by its model matrix. Each vertex carries the
//! index of its face; the fragment shader looks the color up in a six-entry
//! uniform array filled from the mesh's materials.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use arcubes_core::camera::Camera;
use arcubes_core::config::RendererParams;
use arcubes_core::platform::{Renderer, Viewport};
use arcubes_core::scene::Scene;
use js_sys::{Float32Array, Object, Reflect};
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{
    Document, HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlFramebuffer, WebGlProgram,
    WebGlShader, WebGlUniformLocation, WebGlVertexArrayObject,
};

const VERTEX_SHADER: &str = r"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in float a_face;
uniform mat4 u_model;
uniform mat4 u_view;
uniform mat4 u_projection;
flat out int v_face;
void main() {
    v_face = int(a_face);
    gl_Position = u_projection * u_view * u_model * vec4(a_position, 1.0);
}
";

const FRAGMENT_SHADER: &str = r"#version 300 es
precision mediump float;
flat in int v_face;
uniform vec3 u_face_colors[6];
out vec4 fragColor;
void main() {
    fragColor = vec4(u_face_colors[v_face], 1.0);
}
";

/// Corners of each face of a unit cube, in material order (+X, −X, +Y, −Y,
/// +Z, −Z).
const FACE_CORNERS: [[[f32; 3]; 4]; 6] = [
    [
        [0.5, -0.5, -0.5],
        [0.5, 0.5, -0.5],
        [0.5, 0.5, 0.5],
        [0.5, -0.5, 0.5],
    ],
    [
        [-0.5, -0.5, 0.5],
        [-0.5, 0.5, 0.5],
        [-0.5, 0.5, -0.5],
        [-0.5, -0.5, -0.5],
    ],
    [
        [-0.5, 0.5, -0.5],
        [-0.5, 0.5, 0.5],
        [0.5, 0.5, 0.5],
        [0.5, 0.5, -0.5],
    ],
    [
        [-0.5, -0.5, 0.5],
        [-0.5, -0.5, -0.5],
        [0.5, -0.5, -0.5],
        [0.5, -0.5, 0.5],
    ],
    [
        [-0.5, -0.5, 0.5],
        [0.5, -0.5, 0.5],
        [0.5, 0.5, 0.5],
        [-0.5, 0.5, 0.5],
    ],
    [
        [0.5, -0.5, -0.5],
        [-0.5, -0.5, -0.5],
        [-0.5, 0.5, -0.5],
        [0.5, 0.5, -0.5],
    ],
];

/// Two triangles per face quad.
const QUAD_INDICES: [usize; 6] = [0, 1, 2, 0, 2, 3];

/// Floats per vertex: position (3) + face index (1).
const VERTEX_FLOATS: i32 = 4;

/// Vertices per cube.
pub(crate) const CUBE_VERTEX_COUNT: i32 = 36;

/// Builds the interleaved unit-cube vertex data.
pub(crate) fn cube_vertices() -> Vec<f32> {
    let mut out = Vec::with_capacity(36 * 4);
    for (face, corners) in (0_u8..).zip(FACE_CORNERS) {
        for index in QUAD_INDICES {
            out.extend_from_slice(&corners[index]);
            out.push(f32::from(face));
        }
    }
    out
}

/// Errors from [`WebGlRenderer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebGlError {
    /// The canvas refused to create a WebGL2 context.
    NoContext,
    /// A shader failed to compile.
    Compile(String),
    /// The program failed to link.
    Link(String),
    /// A GL object could not be created.
    Resource(&'static str),
    /// `gl.getError()` reported a failure after drawing.
    Gl(u32),
}

impl core::fmt::Display for WebGlError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoContext => write!(f, "WebGL2 is not available"),
            Self::Compile(log) => write!(f, "shader compile failed: {log}"),
            Self::Link(log) => write!(f, "program link failed: {log}"),
            Self::Resource(what) => write!(f, "could not create {what}"),
            Self::Gl(code) => write!(f, "WebGL error 0x{code:04x}"),
        }
    }
}

impl core::error::Error for WebGlError {}

struct Uniforms {
    model: WebGlUniformLocation,
    view: WebGlUniformLocation,
    projection: WebGlUniformLocation,
    face_colors: WebGlUniformLocation,
}

/// Draws a [`Scene`] with WebGL2.
pub struct WebGlRenderer {
    canvas: HtmlCanvasElement,
    gl: Gl,
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    uniforms: Uniforms,
    auto_clear: bool,
}

impl core::fmt::Debug for WebGlRenderer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebGlRenderer")
            .field("width", &self.canvas.width())
            .field("height", &self.canvas.height())
            .field("auto_clear", &self.auto_clear)
            .finish_non_exhaustive()
    }
}

impl WebGlRenderer {
    /// Creates a renderer on a new, detached canvas.
    pub fn new(document: &Document, params: &RendererParams) -> Result<Self, WebGlError> {
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|_| WebGlError::Resource("canvas"))?
            .unchecked_into();

        let options = Object::new();
        set(&options, "alpha", params.alpha)?;
        set(&options, "preserveDrawingBuffer", params.preserve_drawing_buffer)?;
        set(&options, "depth", true)?;
        let gl: Gl = canvas
            .get_context_with_context_options("webgl2", &options)
            .ok()
            .flatten()
            .ok_or(WebGlError::NoContext)?
            .unchecked_into();

        let program = link_program(&gl)?;
        let uniforms = Uniforms {
            model: uniform(&gl, &program, "u_model")?,
            view: uniform(&gl, &program, "u_view")?,
            projection: uniform(&gl, &program, "u_projection")?,
            face_colors: uniform(&gl, &program, "u_face_colors")?,
        };

        let vao = gl
            .create_vertex_array()
            .ok_or(WebGlError::Resource("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));
        let buffer = gl
            .create_buffer()
            .ok_or(WebGlError::Resource("vertex buffer"))?;
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
        let data = Float32Array::from(cube_vertices().as_slice());
        gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &data, Gl::STATIC_DRAW);

        let stride = VERTEX_FLOATS * 4;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 3, Gl::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_with_i32(1, 1, Gl::FLOAT, false, stride, 12);
        gl.bind_vertex_array(None);

        Ok(Self {
            canvas,
            gl,
            program,
            vao,
            uniforms,
            auto_clear: params.auto_clear,
        })
    }

    /// The rendering context.
    #[must_use]
    pub fn context(&self) -> &Gl {
        &self.gl
    }
}

impl Renderer for WebGlRenderer {
    type Framebuffer = WebGlFramebuffer;
    type Error = WebGlError;

    fn bind_framebuffer(&mut self, framebuffer: Option<&WebGlFramebuffer>) {
        self.gl.bind_framebuffer(Gl::FRAMEBUFFER, framebuffer);
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        let width = i32::try_from(viewport.width).unwrap_or(i32::MAX);
        let height = i32::try_from(viewport.height).unwrap_or(i32::MAX);
        self.gl.viewport(viewport.x, viewport.y, width, height);
    }

    fn clear_depth(&mut self) {
        self.gl.clear(Gl::DEPTH_BUFFER_BIT);
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), WebGlError> {
        let gl = &self.gl;
        if self.auto_clear {
            gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
        }
        gl.enable(Gl::DEPTH_TEST);
        gl.use_program(Some(&self.program));
        gl.bind_vertex_array(Some(&self.vao));

        let u = &self.uniforms;
        gl.uniform_matrix4fv_with_f32_array(
            Some(&u.projection),
            false,
            &camera.projection().to_cols_f32(),
        );
        gl.uniform_matrix4fv_with_f32_array(Some(&u.view), false, &camera.view_matrix().to_cols_f32());

        let mut colors = [0.0_f32; 18];
        for mesh in scene.meshes() {
            for (rgb, material) in colors.chunks_exact_mut(3).zip(&mesh.materials) {
                rgb.copy_from_slice(&material.color.to_rgb_f32());
            }
            gl.uniform3fv_with_f32_array(Some(&u.face_colors), &colors);
            gl.uniform_matrix4fv_with_f32_array(
                Some(&u.model),
                false,
                &mesh.world_transform().to_cols_f32(),
            );
            gl.draw_arrays(Gl::TRIANGLES, 0, CUBE_VERTEX_COUNT);
        }
        gl.bind_vertex_array(None);

        match gl.get_error() {
            Gl::NO_ERROR => Ok(()),
            code => Err(WebGlError::Gl(code)),
        }
    }
}

fn set(target: &Object, key: &str, value: bool) -> Result<(), WebGlError> {
    Reflect::set(target, &JsValue::from_str(key), &JsValue::from_bool(value))
        .map(drop)
        .map_err(|_| WebGlError::Resource("context options"))
}

fn uniform(gl: &Gl, program: &WebGlProgram, name: &'static str) -> Result<WebGlUniformLocation, WebGlError> {
    gl.get_uniform_location(program, name)
        .ok_or(WebGlError::Resource(name))
}

fn link_program(gl: &Gl) -> Result<WebGlProgram, WebGlError> {
    let vs = compile_shader(gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
    let fs = compile_shader(gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER)?;

    let program = gl
        .create_program()
        .ok_or(WebGlError::Resource("program"))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);

    if !gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        return Err(WebGlError::Link(log));
    }
    Ok(program)
}

fn compile_shader(gl: &Gl, shader_type: u32, source: &str) -> Result<WebGlShader, WebGlError> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or(WebGlError::Resource("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if !gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        return Err(WebGlError::Compile(format!("{shader_type:#x}: {log}")));
    }
    Ok(shader)
}
