//! View volume of a camera as six inward-facing planes.
//!
//! A plane is stored as `(n, d)` in a `Vec4`; a world point `p` is on the
//! visible side when `n·p + d >= 0`. Portal cameras use an oblique projection,
//! so for them the near plane coincides with the destination portal plane.

use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};
use crate::math::AABB;

pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Culling volume in world space.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    /// Indexed by the `PLANE_*` constants.
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Builds the planes from a combined projection × view matrix.
    ///
    /// Clip space follows the GL convention (`-w <= z <= w`), so each plane is
    /// the last row of the matrix plus or minus one of the other rows.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let (x, y, z, w) = (vp.row(0), vp.row(1), vp.row(2), vp.row(3));

        let planes = [w + x, w - x, w + y, w - y, w + z, w - z].map(normalized_plane);

        Self { planes }
    }

    /// Conservative box test: false only when the box lies entirely behind
    /// one of the planes.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.planes.iter().all(|plane| {
            // corner furthest along the plane normal
            let normal = plane.xyz();
            let corner = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            normal.dot(corner) + plane.w >= 0.0
        })
    }

    /// True when `point` is on the visible side of (or on) every plane.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let homogeneous = point.extend(1.0);
        self.planes.iter().all(|plane| plane.dot(homogeneous) >= 0.0)
    }
}

/// Scales a plane so its normal has unit length. Degenerate planes are kept
/// as-is.
fn normalized_plane(plane: Vec4) -> Vec4 {
    let length = plane.xyz().length();
    if length > 0.0 {
        plane / length
    } else {
        plane
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
