// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 transform.
//!
//! Covers what the camera and the cube scene need (identity, multiply,
//! translation/scale/rotation, inversion, conversion to and from the
//! `Float32Array` layout the XR platform hands out) without pulling in a full
//! linear-algebra crate.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Matrices whose determinant is smaller than this fraction of the product
/// of their column lengths are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, matching the memory layout
/// of WebXR matrices and WebGL uniforms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from 16 column-major `f32` values, as delivered by
    /// `XRView.projectionMatrix` and `XRDevicePose.getViewMatrix()`.
    ///
    /// Widening to `f64` is exact, so [`to_cols_f32`](Self::to_cols_f32)
    /// returns the original values bit for bit.
    #[must_use]
    pub fn from_cols_f32(values: &[f32; 16]) -> Self {
        let mut cols = [[0.0_f64; 4]; 4];
        for (i, v) in values.iter().enumerate() {
            cols[i / 4][i % 4] = f64::from(*v);
        }
        Self { cols }
    }

    /// Returns the 16 column-major values narrowed to `f32`, ready for a
    /// WebGL matrix uniform.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "GPU uniforms are single precision"
    )]
    pub fn to_cols_f32(&self) -> [f32; 16] {
        let mut out = [0.0_f32; 16];
        for (i, v) in out.iter_mut().enumerate() {
            *v = self.cols[i / 4][i % 4] as f32;
        }
        out
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Returns the translation part (column 3, `xyz`).
    #[inline]
    #[must_use]
    pub const fn translation(&self) -> [f64; 3] {
        [self.cols[3][0], self.cols[3][1], self.cols[3][2]]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the X axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_x(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Y axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_y(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, 0.0, -s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a right-handed perspective projection (OpenGL clip space).
    ///
    /// `fov_y` is the vertical field of view in radians.
    #[must_use]
    pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Self {
        let half = fov_y * 0.5;
        let f = half.cos() / half.sin();
        let range = near - far;
        Self {
            cols: [
                [f / aspect, 0.0, 0.0, 0.0],
                [0.0, f, 0.0, 0.0],
                [0.0, 0.0, (far + near) / range, -1.0],
                [0.0, 0.0, 2.0 * far * near / range, 0.0],
            ],
        }
    }

    /// Returns the determinant.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        let c = cofactors(&self.cols);
        let m = &self.cols;
        m[0][0] * c.inv[0][0] + m[1][0] * c.inv[0][1] + m[2][0] * c.inv[0][2] + m[3][0] * c.inv[0][3]
    }

    /// Returns the inverse, or `None` if the matrix is singular or not
    /// finite.
    ///
    /// Singularity is judged relative to the column lengths, so a uniformly
    /// scaled matrix inverts whatever the scale.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        if !self.is_finite() {
            return None;
        }
        let det = self.determinant();
        // Hadamard's bound: |det| never exceeds the product of column lengths.
        let bound: f64 = self
            .cols
            .iter()
            .map(|col| col.iter().map(|v| v * v).sum::<f64>().sqrt())
            .product();
        if bound == 0.0 || det.abs() < SINGULAR_EPSILON * bound {
            return None;
        }
        let Cofactors { mut inv } = cofactors(&self.cols);
        let scale = 1.0 / det;
        for col in &mut inv {
            for v in col.iter_mut() {
                *v *= scale;
            }
        }
        Some(Self { cols: inv })
    }

    /// Applies the transform to a point (`w = 1`), dividing by the resulting
    /// `w` when it is not 1.
    #[must_use]
    pub fn transform_point3(&self, p: [f64; 3]) -> [f64; 3] {
        let c = &self.cols;
        let mut out = [0.0; 4];
        for (i, o) in out.iter_mut().enumerate() {
            *o = c[0][i] * p[0] + c[1][i] * p[1] + c[2][i] * p[2] + c[3][i];
        }
        if out[3] != 0.0 && out[3] != 1.0 {
            [out[0] / out[3], out[1] / out[3], out[2] / out[3]]
        } else {
            [out[0], out[1], out[2]]
        }
    }

    /// Returns `true` if every element differs from `other` by at most
    /// `epsilon`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.cols
            .iter()
            .flatten()
            .zip(other.cols.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

/// Transposed cofactor matrix (the adjugate), column-major.
struct Cofactors {
    inv: [[f64; 4]; 4],
}

/// Computes the adjugate of `m` using 2×2 sub-determinants.
fn cofactors(m: &[[f64; 4]; 4]) -> Cofactors {
    // Element (row r, column c) is m[c][r].
    let a = |r: usize, c: usize| m[c][r];

    let s0 = a(0, 0) * a(1, 1) - a(1, 0) * a(0, 1);
    let s1 = a(0, 0) * a(1, 2) - a(1, 0) * a(0, 2);
    let s2 = a(0, 0) * a(1, 3) - a(1, 0) * a(0, 3);
    let s3 = a(0, 1) * a(1, 2) - a(1, 1) * a(0, 2);
    let s4 = a(0, 1) * a(1, 3) - a(1, 1) * a(0, 3);
    let s5 = a(0, 2) * a(1, 3) - a(1, 2) * a(0, 3);

    let c5 = a(2, 2) * a(3, 3) - a(3, 2) * a(2, 3);
    let c4 = a(2, 1) * a(3, 3) - a(3, 1) * a(2, 3);
    let c3 = a(2, 1) * a(3, 2) - a(3, 1) * a(2, 2);
    let c2 = a(2, 0) * a(3, 3) - a(3, 0) * a(2, 3);
    let c1 = a(2, 0) * a(3, 2) - a(3, 0) * a(2, 2);
    let c0 = a(2, 0) * a(3, 1) - a(3, 0) * a(2, 1);

    // Row-major adjugate b[r][c].
    let b = [
        [
            a(1, 1) * c5 - a(1, 2) * c4 + a(1, 3) * c3,
            -a(0, 1) * c5 + a(0, 2) * c4 - a(0, 3) * c3,
            a(3, 1) * s5 - a(3, 2) * s4 + a(3, 3) * s3,
            -a(2, 1) * s5 + a(2, 2) * s4 - a(2, 3) * s3,
        ],
        [
            -a(1, 0) * c5 + a(1, 2) * c2 - a(1, 3) * c1,
            a(0, 0) * c5 - a(0, 2) * c2 + a(0, 3) * c1,
            -a(3, 0) * s5 + a(3, 2) * s2 - a(3, 3) * s1,
            a(2, 0) * s5 - a(2, 2) * s2 + a(2, 3) * s1,
        ],
        [
            a(1, 0) * c4 - a(1, 1) * c2 + a(1, 3) * c0,
            -a(0, 0) * c4 + a(0, 1) * c2 - a(0, 3) * c0,
            a(3, 0) * s4 - a(3, 1) * s2 + a(3, 3) * s0,
            -a(2, 0) * s4 + a(2, 1) * s2 - a(2, 3) * s0,
        ],
        [
            -a(1, 0) * c3 + a(1, 1) * c1 - a(1, 2) * c0,
            a(0, 0) * c3 - a(0, 1) * c1 + a(0, 2) * c0,
            -a(3, 0) * s3 + a(3, 1) * s1 - a(3, 2) * s0,
            a(2, 0) * s3 - a(2, 1) * s1 + a(2, 2) * s0,
        ],
    ];

    let mut inv = [[0.0_f64; 4]; 4];
    for (r, row) in b.iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            inv[c][r] = *v;
        }
    }
    Cofactors { inv }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn identity_multiply() {
        let t = Transform3d::from_translation(1.0, 2.0, 3.0);
        assert_eq!(Transform3d::IDENTITY * t, t);
        assert_eq!(t * Transform3d::IDENTITY, t);
    }

    #[test]
    fn scale_then_translate() {
        let s = Transform3d::from_scale(2.0, 2.0, 2.0);
        let t = Transform3d::from_translation(3.0, 4.0, 0.0);
        let combined = t * s;
        assert_eq!(combined.col(0), [2.0, 0.0, 0.0, 0.0]);
        assert_eq!(combined.col(3), [3.0, 4.0, 0.0, 1.0]);
    }

    #[test]
    fn f32_columns_survive_unchanged() {
        let mut values = [0.0_f32; 16];
        for (i, v) in values.iter_mut().enumerate() {
            *v = 0.1 + i as f32 * 1.37;
        }
        let t = Transform3d::from_cols_f32(&values);
        assert_eq!(t.to_cols_f32(), values, "f32 → f64 → f32 must be exact");
        // Element 12 is column 3, row 0 (x translation).
        assert_eq!(t.cols[3][0], f64::from(values[12]));
    }

    #[test]
    fn inverse_of_translation() {
        let t = Transform3d::from_translation(1.0, -2.0, 3.5);
        let inv = t.inverse().expect("translation is invertible");
        assert!(inv.approx_eq(&Transform3d::from_translation(-1.0, 2.0, -3.5), EPS));
    }

    #[test]
    fn inverse_round_trip_rigid() {
        let t = Transform3d::from_translation(0.3, 1.6, -2.0)
            * Transform3d::from_rotation_y(0.7)
            * Transform3d::from_rotation_x(-0.2);
        let inv = t.inverse().expect("rigid transform is invertible");
        assert!((t * inv).approx_eq(&Transform3d::IDENTITY, EPS), "t * t⁻¹ = I");
        assert!((inv * t).approx_eq(&Transform3d::IDENTITY, EPS), "t⁻¹ * t = I");
    }

    #[test]
    fn inverse_of_projection() {
        let p = Transform3d::perspective(1.2, 1.5, 0.1, 100.0);
        let inv = p.inverse().expect("perspective is invertible");
        assert!((p * inv).approx_eq(&Transform3d::IDENTITY, 1e-7), "p * p⁻¹ = I");
    }

    #[test]
    fn singular_has_no_inverse() {
        let flat = Transform3d::from_scale(1.0, 0.0, 1.0);
        assert_eq!(flat.determinant(), 0.0);
        assert!(flat.inverse().is_none());

        let mut nan = Transform3d::IDENTITY;
        nan.cols[1][2] = f64::NAN;
        assert!(!nan.is_finite());
        assert!(nan.inverse().is_none(), "non-finite input must not invert");
    }

    #[test]
    fn tiny_uniform_scale_still_inverts() {
        let t = Transform3d::from_translation(0.3, 1.6, -2.0)
            * Transform3d::from_scale(1e-4, 1e-4, 1e-4);
        assert!(t.determinant().abs() < 1e-11, "absolute determinant is tiny");
        let inv = t.inverse().expect("uniformly scaled matrix is invertible");
        assert!((t * inv).approx_eq(&Transform3d::IDENTITY, 1e-9), "t * t⁻¹ = I");
    }

    #[test]
    fn nearly_dependent_columns_are_singular() {
        let mut t = Transform3d::IDENTITY;
        t.cols[1] = [1.0, 1e-14, 0.0, 0.0];
        assert!(t.inverse().is_none());
    }

    #[test]
    fn determinant_of_scale() {
        let s = Transform3d::from_scale(2.0, 3.0, 4.0);
        assert!((s.determinant() - 24.0).abs() < EPS);
    }

    #[test]
    fn rotation_y_moves_forward_axis() {
        let r = Transform3d::from_rotation_y(core::f64::consts::FRAC_PI_2);
        let p = r.transform_point3([0.0, 0.0, -1.0]);
        assert!((p[0] + 1.0).abs() < EPS, "got {p:?}");
        assert!(p[2].abs() < EPS, "got {p:?}");
    }

    #[test]
    fn perspective_maps_near_plane_to_minus_one() {
        let p = Transform3d::perspective(core::f64::consts::FRAC_PI_2, 1.0, 0.5, 10.0);
        let near = p.transform_point3([0.0, 0.0, -0.5]);
        let far = p.transform_point3([0.0, 0.0, -10.0]);
        assert!((near[2] + 1.0).abs() < 1e-9, "near → -1, got {near:?}");
        assert!((far[2] - 1.0).abs() < 1e-9, "far → 1, got {far:?}");
    }
}
