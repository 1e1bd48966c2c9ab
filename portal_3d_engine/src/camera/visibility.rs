/// Visibility gate for portal rendering.
///
/// A portal only needs to render its view when the linked portal's display
/// surface can be seen by the viewer. Skipping is purely a cost saving: when
/// in doubt (non-finite input) the surface is reported visible.

use glam::Mat4;
use crate::math::{AABB, Pose};
use super::camera::Camera;
use super::frustum::Frustum;

/// Whether `bounds` (world space) is at least partially inside the frustum
/// of a viewer at `viewer_pose` using `projection`.
pub fn is_visible(bounds: &AABB, viewer_pose: &Pose, projection: &Mat4) -> bool {
    let view_projection = *projection * viewer_pose.world_to_local();
    if !bounds.is_finite() || !view_projection.is_finite() {
        return true;
    }

    Frustum::from_view_projection(&view_projection).intersects_aabb(bounds)
}

/// `is_visible` against a camera's pose and current projection matrix.
pub fn is_visible_from(bounds: &AABB, camera: &Camera) -> bool {
    is_visible(bounds, camera.pose(), camera.projection_matrix())
}

#[cfg(test)]
#[path = "visibility_tests.rs"]
mod tests;
