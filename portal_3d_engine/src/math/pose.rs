/// Pose: rigid transform (position + orientation) and the composition
/// helpers used to carry a frame through a portal pair.
///
/// Conventions:
/// - Right-handed coordinates.
/// - A portal's forward axis is its local `+Z`.
/// - A camera looks down its local `-Z` (same as `Mat4::look_at_rh`).

use glam::{Mat3, Mat4, Quat, Vec3};

/// Columns shorter than this are treated as degenerate by `extract_rotation`.
const MIN_AXIS_LENGTH: f32 = 1e-6;

/// Position + unit orientation.
///
/// The rotation is expected to be normalized; every constructor in the crate
/// produces normalized quaternions, and `extract_rotation` re-normalizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World-space position
    pub position: Vec3,
    /// World-space orientation (unit quaternion)
    pub rotation: Quat,
}

impl Pose {
    /// Pose at the origin with no rotation.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a pose from a position and an orientation.
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with no rotation.
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Local-to-world matrix.
    pub fn local_to_world(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// World-to-local matrix (inverse of `local_to_world`).
    ///
    /// Computed from the conjugate rotation rather than a general 4x4 inverse.
    pub fn world_to_local(&self) -> Mat4 {
        let inverse = self.rotation.inverse();
        Mat4::from_rotation_translation(inverse, inverse * -self.position)
    }

    /// Local `+Z` expressed in world space (a portal's forward axis).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Local `+Y` expressed in world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Local `+X` expressed in world space.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Transform a local-space point into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Transform a world-space point into this pose's local space.
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Whether position and rotation contain only finite values.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Compose two affine transforms: `inner` is applied first, then `outer`.
///
/// With `outer = frame.local_to_world()` this re-expresses a transform
/// described in `frame`'s space in world space.
pub fn compose(outer: &Mat4, inner: &Mat4) -> Mat4 {
    *outer * *inner
}

/// Carry `target` from the space around `from` to the same relative place
/// around `to`.
///
/// Evaluates `to.local_to_world * from.world_to_local * target`.
///
/// - Virtual camera of portal P linked to L: `relocate(L, P, viewer)`.
/// - Traveller crossing portal P linked to L: `relocate(P, L, traveller)`.
pub fn relocate(from: &Pose, to: &Pose, target: &Mat4) -> Mat4 {
    compose(&compose(&to.local_to_world(), &from.world_to_local()), target)
}

/// Translation part of an affine matrix (its fourth column).
pub fn extract_translation(matrix: &Mat4) -> Vec3 {
    matrix.w_axis.truncate()
}

/// Rotation part of an affine matrix.
///
/// Scale is removed by normalizing each basis column. A mirrored basis is
/// turned into a proper rotation by flipping its Z column. Degenerate or
/// non-finite bases yield the identity rotation.
pub fn extract_rotation(matrix: &Mat4) -> Quat {
    let x = matrix.x_axis.truncate();
    let y = matrix.y_axis.truncate();
    let z = matrix.z_axis.truncate();

    let (lx, ly, lz) = (x.length(), y.length(), z.length());
    if !(lx.is_finite() && ly.is_finite() && lz.is_finite())
        || lx < MIN_AXIS_LENGTH
        || ly < MIN_AXIS_LENGTH
        || lz < MIN_AXIS_LENGTH
    {
        return Quat::IDENTITY;
    }

    let mut basis = Mat3::from_cols(x / lx, y / ly, z / lz);
    if basis.determinant() < 0.0 {
        basis.z_axis = -basis.z_axis;
    }

    Quat::from_mat3(&basis).normalize()
}

/// Pose implied by an affine matrix (translation + normalized rotation).
pub fn extract_pose(matrix: &Mat4) -> Pose {
    Pose::new(extract_translation(matrix), extract_rotation(matrix))
}

#[cfg(test)]
#[path = "pose_tests.rs"]
mod tests;
