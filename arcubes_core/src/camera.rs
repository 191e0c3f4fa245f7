// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Perspective camera with externally driven matrices.
//!
//! In AR the tracking system is the only authority on where the camera is.
//! [`Camera::new_tracked`] therefore turns automatic matrix recomputation
//! off: the local matrix is written directly from the inverted pose view
//! matrix, the projection is copied from the platform, and
//! [`update_matrix_world`](Camera::update_matrix_world) only propagates what
//! was written.
//!
//! The camera has no parent, so its world matrix equals its local matrix
//! once propagated.

use crate::transform::Transform3d;

/// Default vertical field of view, in degrees.
pub const DEFAULT_FOV_DEG: f64 = 50.0;
/// Default near clip plane.
pub const DEFAULT_NEAR: f64 = 0.1;
/// Default far clip plane.
pub const DEFAULT_FAR: f64 = 2000.0;

/// A perspective camera.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    projection: Transform3d,
    matrix: Transform3d,
    world: Transform3d,
    view: Transform3d,
    position: [f64; 3],
    matrix_auto_update: bool,
    world_needs_update: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Creates a camera at the origin with a default perspective projection
    /// and automatic matrix updates enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            projection: Transform3d::perspective(
                DEFAULT_FOV_DEG.to_radians(),
                1.0,
                DEFAULT_NEAR,
                DEFAULT_FAR,
            ),
            matrix: Transform3d::IDENTITY,
            world: Transform3d::IDENTITY,
            view: Transform3d::IDENTITY,
            position: [0.0; 3],
            matrix_auto_update: true,
            world_needs_update: false,
        }
    }

    /// Creates a camera whose matrices are driven by pose tracking.
    ///
    /// Equivalent to [`new`](Self::new) followed by
    /// `set_matrix_auto_update(false)`.
    #[must_use]
    pub fn new_tracked() -> Self {
        let mut camera = Self::new();
        camera.set_matrix_auto_update(false);
        camera
    }

    /// Whether the local matrix is recomputed from
    /// [`position`](Self::position) on every world update.
    #[must_use]
    pub const fn matrix_auto_update(&self) -> bool {
        self.matrix_auto_update
    }

    /// Enables or disables automatic local matrix recomputation.
    pub fn set_matrix_auto_update(&mut self, enabled: bool) {
        self.matrix_auto_update = enabled;
    }

    /// Returns the camera position used when automatic updates are enabled.
    #[must_use]
    pub const fn position(&self) -> [f64; 3] {
        self.position
    }

    /// Sets the camera position used when automatic updates are enabled.
    pub fn set_position(&mut self, position: [f64; 3]) {
        self.position = position;
    }

    /// Returns the projection matrix.
    #[must_use]
    pub const fn projection(&self) -> &Transform3d {
        &self.projection
    }

    /// Copies a platform projection matrix verbatim.
    pub fn set_projection_from_cols(&mut self, values: &[f32; 16]) {
        self.projection = Transform3d::from_cols_f32(values);
    }

    /// Returns the local matrix (camera-to-parent).
    #[must_use]
    pub const fn matrix(&self) -> &Transform3d {
        &self.matrix
    }

    /// Writes the local matrix directly.
    ///
    /// The world matrix is stale until
    /// [`update_matrix_world`](Self::update_matrix_world) runs.
    pub fn set_matrix(&mut self, matrix: Transform3d) {
        self.matrix = matrix;
        self.world_needs_update = true;
    }

    /// Returns the world matrix (camera-to-world).
    #[must_use]
    pub const fn world(&self) -> &Transform3d {
        &self.world
    }

    /// Returns the view matrix (world-to-camera), the inverse of
    /// [`world`](Self::world).
    #[must_use]
    pub const fn view_matrix(&self) -> &Transform3d {
        &self.view
    }

    /// Returns `true` if the local matrix was written since the last world
    /// update.
    #[must_use]
    pub const fn world_needs_update(&self) -> bool {
        self.world_needs_update
    }

    /// Propagates the local matrix to the world matrix.
    ///
    /// With automatic updates on, the local matrix is first rebuilt from the
    /// position. Propagation happens when the local matrix changed or `force`
    /// is set. The cached view matrix is refreshed alongside; a singular
    /// world matrix leaves the view matrix as identity.
    pub fn update_matrix_world(&mut self, force: bool) {
        if self.matrix_auto_update {
            let [x, y, z] = self.position;
            self.matrix = Transform3d::from_translation(x, y, z);
            self.world_needs_update = true;
        }
        if self.world_needs_update || force {
            self.world = self.matrix;
            self.view = self.world.inverse().unwrap_or(Transform3d::IDENTITY);
            self.world_needs_update = false;
        }
    }
}
