use glam::{Quat, Vec3};
use std::f32::consts::PI;
use crate::renderer::mock_renderer::MockRenderer;
use crate::renderer::{Renderer, TextureDesc, TextureFormat};
use super::*;

const EPSILON: f32 = 1e-5;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

#[test]
fn test_new_surface_defaults() {
    let surface = DisplaySurface::new(2.0, 3.0);

    assert!(surface.is_enabled());
    assert_eq!(surface.local_position(), Vec3::ZERO);
    assert_eq!(surface.local_scale(), Vec3::new(2.0, 3.0, DEFAULT_SURFACE_THICKNESS));
    assert!(surface.main_texture().is_none());
}

#[test]
fn test_world_bounds_follow_portal_pose() {
    let surface = DisplaySurface::new(2.0, 3.0);
    let pose = Pose::from_position(Vec3::new(10.0, 0.0, 0.0));
    let bounds = surface.world_bounds(&pose);

    assert!(approx_vec3(bounds.center(), Vec3::new(10.0, 0.0, 0.0)));
    assert!(approx_vec3(bounds.half_extents(), Vec3::new(1.0, 1.5, DEFAULT_SURFACE_THICKNESS * 0.5)));
}

#[test]
fn test_world_bounds_rotated_portal() {
    let surface = DisplaySurface::new(2.0, 3.0);
    let pose = Pose::new(Vec3::ZERO, Quat::from_rotation_y(PI * 0.5));
    let bounds = surface.world_bounds(&pose);

    // Width now runs along Z
    assert!((bounds.half_extents().z - 1.0).abs() < EPSILON);
    assert!(bounds.half_extents().x < 0.01);
}

#[test]
fn test_material_main_texture_slot() {
    let mut renderer = MockRenderer::new();
    let desc = TextureDesc::view_target(8, 8, TextureFormat::R8G8B8A8_UNORM);
    let texture = renderer.create_view_texture(&desc).unwrap();

    let mut surface = DisplaySurface::new(1.0, 1.0);
    assert!(surface.material_mut().set_texture(MAIN_TEXTURE, texture.clone()).is_none());
    assert!(Arc::ptr_eq(surface.main_texture().unwrap(), &texture));
    assert_eq!(surface.material().texture_count(), 1);

    drop(texture);
    assert_eq!(renderer.released(), 0);

    surface.material_mut().clear_texture(MAIN_TEXTURE);
    assert_eq!(renderer.released(), 1);
}

#[test]
fn test_material_debug_lists_slots() {
    let mut renderer = MockRenderer::new();
    let desc = TextureDesc::view_target(8, 8, TextureFormat::R8G8B8A8_UNORM);
    let mut material = Material::new();
    material.set_texture(MAIN_TEXTURE, renderer.create_view_texture(&desc).unwrap());

    assert!(format!("{:?}", material).contains("main_texture"));
}

#[test]
fn test_protect_screen_thickness_from_projection() {
    let projection = Projection::default();
    let mut surface = DisplaySurface::new(2.0, 3.0);
    let pose = Pose::IDENTITY;

    let half_h = projection.near * (projection.fov_y * 0.5).tan();
    let half_w = half_h * projection.aspect;
    let expected = Vec3::new(half_w, half_h, projection.near).length();

    let thickness = protect_screen_from_clipping(&mut surface, &pose, Vec3::new(0.0, 0.0, -5.0), &projection);

    assert!((thickness - expected).abs() < EPSILON);
    assert!((surface.thickness() - expected).abs() < EPSILON);
    assert_eq!(surface.local_scale().x, 2.0);
    assert_eq!(surface.local_scale().y, 3.0);
}

#[test]
fn test_protect_screen_extrudes_away_from_viewer() {
    let projection = Projection::default();
    let pose = Pose::IDENTITY;

    // Viewer behind the portal (portal forward points away from it)
    let mut surface = DisplaySurface::new(2.0, 3.0);
    let thickness = protect_screen_from_clipping(&mut surface, &pose, Vec3::new(0.0, 0.0, -5.0), &projection);
    assert!((surface.local_position().z - thickness * 0.5).abs() < EPSILON);

    // Viewer in front of the portal
    let mut surface = DisplaySurface::new(2.0, 3.0);
    let thickness = protect_screen_from_clipping(&mut surface, &pose, Vec3::new(0.0, 0.0, 5.0), &projection);
    assert!((surface.local_position().z + thickness * 0.5).abs() < EPSILON);
}

#[test]
fn test_protect_screen_viewer_on_plane_uses_negative_side() {
    let projection = Projection::default();
    let mut surface = DisplaySurface::new(1.0, 1.0);
    let thickness = protect_screen_from_clipping(&mut surface, &Pose::IDENTITY, Vec3::new(3.0, 0.0, 0.0), &projection);

    assert!((surface.local_position().z + thickness * 0.5).abs() < EPSILON);
}
