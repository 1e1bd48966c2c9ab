/// Oblique near-clip plane for portal virtual cameras.
///
/// A virtual camera sits behind its portal, so everything between the camera
/// and the portal plane must be clipped away. Instead of an extra clip
/// distance, the projection's near plane is replaced by the portal plane
/// (Lengyel's oblique frustum technique, OpenGL-style clip space).

use glam::{Mat4, Vec3, Vec4};
use crate::math::Pose;

/// Bias pushing the clip plane toward the camera, hiding seams at the portal edge.
pub const DEFAULT_NEAR_CLIP_OFFSET: f32 = 0.05;

/// Below this camera-space plane distance the standard projection is kept.
pub const DEFAULT_NEAR_CLIP_LIMIT: f32 = 0.2;

const MIN_AXIS_LENGTH_SQUARED: f32 = 1e-12;
const MIN_DETERMINANT: f32 = 1e-12;
const MIN_DENOMINATOR: f32 = 1e-6;

/// Camera-space plane `dot(normal, p) + distance = 0`.
///
/// Points with a positive value are kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlane {
    pub normal: Vec3,
    pub distance: f32,
}

impl ClipPlane {
    /// Plane as `(nx, ny, nz, d)`.
    pub fn as_vec4(&self) -> Vec4 {
        self.normal.extend(self.distance)
    }
}

/// Camera-space portal plane, oriented so the camera lies on the clipped side.
///
/// The normal is the portal forward axis flipped toward the far side of the
/// portal as seen from the camera. `near_offset` is added to the distance.
///
/// Returns `None` when the portal forward axis or either pose is degenerate.
pub fn portal_clip_plane(portal_pose: &Pose, camera_pose: &Pose, near_offset: f32) -> Option<ClipPlane> {
    if !portal_pose.is_finite() || !camera_pose.is_finite() {
        return None;
    }
    let forward = portal_pose.forward();
    if forward.length_squared() < MIN_AXIS_LENGTH_SQUARED {
        return None;
    }

    let side = if forward.dot(portal_pose.position - camera_pose.position) < 0.0 { -1.0 } else { 1.0 };

    let world_to_camera = camera_pose.world_to_local();
    let camera_space_position = world_to_camera.transform_point3(portal_pose.position);
    let camera_space_normal = world_to_camera.transform_vector3(forward) * side;
    let distance = -camera_space_position.dot(camera_space_normal) + near_offset;

    Some(ClipPlane {
        normal: camera_space_normal,
        distance,
    })
}

/// Projection for a virtual camera looking through `portal_pose`.
///
/// When the camera is within `near_limit` of the (offset) portal plane the
/// oblique matrix becomes numerically unstable, so `base_projection` is
/// returned unchanged. Degenerate input also yields `base_projection`.
pub fn compute_oblique_projection(
    portal_pose: &Pose,
    camera_pose: &Pose,
    base_projection: &Mat4,
    near_offset: f32,
    near_limit: f32,
) -> Mat4 {
    let Some(plane) = portal_clip_plane(portal_pose, camera_pose, near_offset) else {
        crate::engine_trace!("portal3d::ClipPlane", "Degenerate portal plane, keeping standard projection");
        return *base_projection;
    };

    if plane.distance.abs() <= near_limit {
        return *base_projection;
    }

    apply_oblique_clip(base_projection, plane.as_vec4()).unwrap_or(*base_projection)
}

/// Replace the near plane of a perspective projection with `clip_plane`
/// (camera space, camera on its negative side).
///
/// Returns `None` if the projection is singular or the result is not finite.
pub fn apply_oblique_clip(projection: &Mat4, clip_plane: Vec4) -> Option<Mat4> {
    if !clip_plane.is_finite() || projection.determinant().abs() < MIN_DETERMINANT {
        return None;
    }

    // Camera-space corner of the frustum opposite the clip plane
    let q = projection.inverse()
        * Vec4::new(clip_plane.x.signum(), clip_plane.y.signum(), 1.0, 1.0);
    let denominator = clip_plane.dot(q);
    if denominator.abs() < MIN_DENOMINATOR {
        return None;
    }

    let c = clip_plane * (2.0 / denominator);
    let mut m = projection.to_cols_array_2d();
    m[0][2] = c.x - m[0][3];
    m[1][2] = c.y - m[1][3];
    m[2][2] = c.z - m[2][3];
    m[3][2] = c.w - m[3][3];

    let oblique = Mat4::from_cols_array_2d(&m);
    oblique.is_finite().then_some(oblique)
}

#[cfg(test)]
#[path = "clip_plane_tests.rs"]
mod tests;
