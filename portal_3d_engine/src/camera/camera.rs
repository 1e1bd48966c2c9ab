/// Camera: pose, perspective parameters and the projection matrix in use.
///
/// The projection matrix normally follows the perspective parameters, but a
/// portal's virtual camera replaces it with an oblique variant each frame
/// (`set_projection_matrix`). Setting new parameters resets the override.

use glam::{Mat4, Vec2, Vec3};
use crate::math::Pose;
use crate::renderer::Viewport;
use super::frustum::Frustum;

/// Perspective projection parameters (OpenGL-style `[-1, 1]` clip depth).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Width / height
    pub aspect: f32,
    /// Near clip distance (> 0)
    pub near: f32,
    /// Far clip distance (> near)
    pub far: f32,
}

impl Projection {
    /// Create perspective parameters.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self { fov_y, aspect, near, far }
    }

    /// Standard (non-oblique) projection matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Half width (x) and half height (y) of the near clip rectangle.
    pub fn near_plane_half_size(&self) -> Vec2 {
        let half_height = self.near * (self.fov_y * 0.5).tan();
        Vec2::new(half_height * self.aspect, half_height)
    }

    /// Distance from the eye to a corner of the near clip rectangle.
    pub fn near_plane_corner_distance(&self) -> f32 {
        let half = self.near_plane_half_size();
        Vec3::new(half.x, half.y, self.near).length()
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::perspective(60f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0)
    }
}

/// A camera: where it is, how it projects, and which viewport it fills.
#[derive(Debug, Clone)]
pub struct Camera {
    pose: Pose,
    projection: Projection,
    projection_matrix: Mat4,
    viewport: Viewport,
}

impl Camera {
    /// Create a new camera. The projection matrix is derived from `projection`.
    pub fn new(pose: Pose, projection: Projection, viewport: Viewport) -> Self {
        Self {
            pose,
            projection,
            projection_matrix: projection.matrix(),
            viewport,
        }
    }

    // ===== GETTERS =====

    /// World pose (the camera looks down its local -Z).
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// World position.
    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    /// Perspective parameters.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Projection matrix in use (possibly oblique).
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// View matrix (world-to-camera).
    pub fn view_matrix(&self) -> Mat4 {
        self.pose.world_to_local()
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix()
    }

    /// Frustum planes of the projection in use.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection_matrix())
    }

    /// Viewport dimensions and depth range.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    // ===== SETTERS =====

    /// Set the world pose.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Set perspective parameters and reset the projection matrix to match.
    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.projection_matrix = projection.matrix();
    }

    /// Override the projection matrix (e.g. with an oblique variant).
    pub fn set_projection_matrix(&mut self, matrix: Mat4) {
        self.projection_matrix = matrix;
    }

    /// Set the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
