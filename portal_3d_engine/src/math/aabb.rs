//! Axis-aligned boxes used for surface visibility.
//!
//! A display surface keeps its bounds in mesh space and moves them into
//! world space per visibility query with [`AABB::transformed`].

use glam::{Mat3, Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    /// Corners may be given in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self { min: center - half, max: center + half }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Tight box around `matrix` applied to this box (Arvo): the center is
    /// transformed as a point, the half extents through the absolute value
    /// of the linear part.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let linear = Mat3::from_mat4(*matrix);
        let abs_linear = Mat3::from_cols(linear.x_axis.abs(), linear.y_axis.abs(), linear.z_axis.abs());

        let center = matrix.transform_point3(self.center());
        let half = abs_linear * self.half_extents();

        AABB { min: center - half, max: center + half }
    }

    /// True when `other` lies entirely inside (boundaries included).
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// True when the boxes overlap or touch.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
