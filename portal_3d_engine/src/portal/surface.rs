/// Display surface of a portal: the planar "screen" showing the linked
/// portal's view, plus the minimal material that samples that view.

use std::fmt;
use std::sync::Arc;
use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::camera::Projection;
use crate::math::{AABB, Pose};
use crate::renderer::Texture;

/// Material slot sampled by a display surface
pub const MAIN_TEXTURE: &str = "main_texture";

/// Depth of a display surface before any clipping protection is applied
pub const DEFAULT_SURFACE_THICKNESS: f32 = 0.01;

// ===== MATERIAL =====

/// Named texture slots of a display surface
#[derive(Default, Clone)]
pub struct Material {
    textures: FxHashMap<String, Arc<dyn Texture>>,
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `texture` to `slot`, returning the previously bound texture.
    pub fn set_texture(&mut self, slot: &str, texture: Arc<dyn Texture>) -> Option<Arc<dyn Texture>> {
        self.textures.insert(slot.to_string(), texture)
    }

    pub fn texture(&self, slot: &str) -> Option<&Arc<dyn Texture>> {
        self.textures.get(slot)
    }

    pub fn clear_texture(&mut self, slot: &str) -> Option<Arc<dyn Texture>> {
        self.textures.remove(slot)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut slots: Vec<&str> = self.textures.keys().map(String::as_str).collect();
        slots.sort_unstable();
        f.debug_struct("Material").field("slots", &slots).finish()
    }
}

// ===== DISPLAY SURFACE =====

/// Planar box mesh placed relative to its portal.
///
/// The mesh is a unit cube centered on the origin, scaled by `local_scale`
/// (x = width, y = height, z = thickness) and offset by `local_position`
/// along the portal's local axes.
#[derive(Debug, Clone)]
pub struct DisplaySurface {
    mesh_bounds: AABB,
    local_position: Vec3,
    local_scale: Vec3,
    enabled: bool,
    material: Material,
}

impl DisplaySurface {
    /// A `width` x `height` screen centered on the portal.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            mesh_bounds: AABB::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5)),
            local_position: Vec3::ZERO,
            local_scale: Vec3::new(width, height, DEFAULT_SURFACE_THICKNESS),
            enabled: true,
            material: Material::new(),
        }
    }

    pub fn local_position(&self) -> Vec3 {
        self.local_position
    }

    pub fn set_local_position(&mut self, position: Vec3) {
        self.local_position = position;
    }

    pub fn local_scale(&self) -> Vec3 {
        self.local_scale
    }

    pub fn set_local_scale(&mut self, scale: Vec3) {
        self.local_scale = scale;
    }

    pub fn thickness(&self) -> f32 {
        self.local_scale.z
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    /// Texture currently displayed on the surface.
    pub fn main_texture(&self) -> Option<&Arc<dyn Texture>> {
        self.material.texture(MAIN_TEXTURE)
    }

    /// Surface transform relative to its portal.
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.local_scale, Quat::IDENTITY, self.local_position)
    }

    pub fn world_matrix(&self, portal_pose: &Pose) -> Mat4 {
        portal_pose.local_to_world() * self.local_matrix()
    }

    /// World-space bounds of the surface mesh.
    pub fn world_bounds(&self, portal_pose: &Pose) -> AABB {
        self.mesh_bounds.transformed(&self.world_matrix(portal_pose))
    }
}

/// Thicken `surface` so the near plane of a camera at `viewpoint` cannot
/// slice through it while the camera passes the portal.
///
/// The box is extruded away from the viewer by the distance to a corner of
/// the near clip rectangle. Returns that thickness.
pub fn protect_screen_from_clipping(
    surface: &mut DisplaySurface,
    portal_pose: &Pose,
    viewpoint: Vec3,
    projection: &Projection,
) -> f32 {
    let thickness = projection.near_plane_corner_distance();
    let facing_same_dir = portal_pose.forward().dot(portal_pose.position - viewpoint) > 0.0;

    let mut scale = surface.local_scale();
    scale.z = thickness;
    surface.set_local_scale(scale);

    let offset = if facing_same_dir { 0.5 } else { -0.5 };
    surface.set_local_position(Vec3::new(0.0, 0.0, thickness * offset));

    thickness
}

#[cfg(test)]
#[path = "surface_tests.rs"]
mod tests;
