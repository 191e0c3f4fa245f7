// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The static cube scene.
//!
//! A [`Scene`] is built once per session and only read afterwards. Each
//! [`Mesh`] is a box with one [`Material`] per face.

use alloc::vec::Vec;

use crate::transform::Transform3d;

/// A 24-bit RGB color in `0xRRGGBB` form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    /// Pure red.
    pub const RED: Self = Self(0xff_00_00);
    /// Pure green.
    pub const GREEN: Self = Self(0x00_ff_00);
    /// Pure blue.
    pub const BLUE: Self = Self(0x00_00_ff);
    /// Magenta.
    pub const MAGENTA: Self = Self(0xff_00_ff);
    /// Cyan.
    pub const CYAN: Self = Self(0x00_ff_ff);
    /// Yellow.
    pub const YELLOW: Self = Self(0xff_ff_00);

    /// Red channel.
    #[must_use]
    pub const fn r(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    /// Green channel.
    #[must_use]
    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    /// Blue channel.
    #[must_use]
    pub const fn b(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// Returns the channels normalized to `0.0..=1.0`.
    #[must_use]
    pub fn to_rgb_f32(self) -> [f32; 3] {
        [
            f32::from(self.r()) / 255.0,
            f32::from(self.g()) / 255.0,
            f32::from(self.b()) / 255.0,
        ]
    }
}

impl core::fmt::Debug for Color {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Color(#{:06x})", self.0)
    }
}

/// An unlit, single-color material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Material {
    /// Surface color.
    pub color: Color,
}

impl Material {
    /// Creates a material with the given color.
    #[must_use]
    pub const fn basic(color: Color) -> Self {
        Self { color }
    }
}

/// Axis-aligned box dimensions, centered on the mesh origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxGeometry {
    /// Extent along X.
    pub width: f64,
    /// Extent along Y.
    pub height: f64,
    /// Extent along Z.
    pub depth: f64,
}

impl BoxGeometry {
    /// A cube with the given edge length.
    #[must_use]
    pub const fn cube(size: f64) -> Self {
        Self {
            width: size,
            height: size,
            depth: size,
        }
    }
}

/// Face order used for [`Mesh::materials`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    /// +X.
    Right,
    /// −X.
    Left,
    /// +Y.
    Top,
    /// −Y.
    Bottom,
    /// +Z.
    Front,
    /// −Z.
    Back,
}

impl Face {
    /// All faces, in material order.
    pub const ALL: [Self; 6] = [
        Self::Right,
        Self::Left,
        Self::Top,
        Self::Bottom,
        Self::Front,
        Self::Back,
    ];
}

/// A box placed in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    /// Box dimensions.
    pub geometry: BoxGeometry,
    /// One material per face, in [`Face::ALL`] order.
    pub materials: [Material; 6],
    /// World-space position of the box center.
    pub position: [f64; 3],
}

impl Mesh {
    /// Returns the model matrix mapping a unit cube (−0.5..0.5) onto this
    /// box.
    #[must_use]
    pub fn world_transform(&self) -> Transform3d {
        let [x, y, z] = self.position;
        let g = self.geometry;
        Transform3d::from_translation(x, y, z) * Transform3d::from_scale(g.width, g.height, g.depth)
    }

    /// Returns the material for one face.
    #[must_use]
    pub fn material(&self, face: Face) -> Material {
        self.materials[face as usize]
    }
}

/// Parameters for [`Scene::cube_grid`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubeGridConfig {
    /// Cubes per axis.
    pub row_count: u32,
    /// Distance between neighbouring cube centers.
    pub spread: f64,
    /// Cube edge length.
    pub cube_size: f64,
    /// Face materials shared by every cube, in [`Face::ALL`] order.
    pub palette: [Color; 6],
}

impl CubeGridConfig {
    /// A 4×4×4 grid of 0.2 m cubes one meter apart.
    pub const DEFAULT: Self = Self {
        row_count: 4,
        spread: 1.0,
        cube_size: 0.2,
        palette: [
            Color::RED,
            Color::BLUE,
            Color::GREEN,
            Color::MAGENTA,
            Color::CYAN,
            Color::YELLOW,
        ],
    };
}

impl Default for CubeGridConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Owner of every renderable mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    meshes: Vec<Mesh>,
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a `row_count³` grid of cubes centered (within one cell) on the
    /// origin.
    ///
    /// Cube `(i, j, k)` sits at `(i − half, j − half, k − half) × spread`
    /// with `half = row_count / 2`, so an even grid extends one cell further
    /// on the negative side.
    #[must_use]
    pub fn cube_grid(config: &CubeGridConfig) -> Self {
        let n = config.row_count;
        let half = i64::from(n / 2);
        let materials = config.palette.map(Material::basic);
        let geometry = BoxGeometry::cube(config.cube_size);

        let mut scene = Self::new();
        for i in 0..i64::from(n) {
            for j in 0..i64::from(n) {
                for k in 0..i64::from(n) {
                    let cell = [i - half, j - half, k - half];
                    scene.add(Mesh {
                        geometry,
                        materials,
                        position: cell.map(|c| c as f64 * config.spread),
                    });
                }
            }
        }
        scene
    }

    /// Adds a mesh.
    pub fn add(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    /// Returns all meshes in insertion order.
    #[must_use]
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Returns the number of meshes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Returns `true` if the scene has no meshes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
