//! Integration tests for PortalWorld
//!
//! Drives a linked pair of portals through the public API only: rendering
//! frames for a moving viewer and walking travellers through the portals.
//! No GPU required.
//!
//! Run with: cargo test --test portal_integration_tests


use std::f32::consts::PI;
use portal_3d_engine::glam::{Quat, Vec3};
use portal_3d_engine::portal3d::{
    BodyTraveller, Error, FrameStats, PortalConfig, PortalKey, PortalWorld, RenderOrder,
    RigidTraveller,
};
use portal_3d_engine::portal3d::math::{Pose, relocate, extract_pose};
use portal_3d_engine::portal3d::portal::DisplaySurface;
use test_utils::{RecordingRenderer, viewer_at};

// ============================================================================
// Helpers
// ============================================================================

/// A at the origin facing +Z, B at (10, 0, 0) facing -Z
fn create_scenario(config: PortalConfig) -> (PortalWorld, PortalKey, PortalKey) {
    let mut world = PortalWorld::new(config).unwrap();
    let a = world.add_portal("A", Pose::IDENTITY, DisplaySurface::new(2.0, 3.0)).unwrap();
    let b = world.add_portal(
        "B",
        Pose::new(Vec3::new(10.0, 0.0, 0.0), Quat::from_rotation_y(PI)),
        DisplaySurface::new(2.0, 3.0),
    ).unwrap();
    world.link(a, b).unwrap();
    world.validate().unwrap();
    (world, a, b)
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_integration_frame_renders_visible_portal_only() {
    let (mut world, a, b) = create_scenario(PortalConfig::default());
    let mut renderer = RecordingRenderer::new();
    let viewer = viewer_at(Vec3::new(0.0, 0.0, 5.0));

    let stats = world.render_frame(&viewer, &mut renderer).unwrap();

    assert_eq!(stats, FrameStats { rendered: 1, culled: 1, skipped: 0, passes: 1 });
    assert_eq!(renderer.views.len(), 1);

    let view = &renderer.views[0];
    assert_eq!(view.portal, b);
    assert_eq!(view.visible_surfaces, vec![a]);
    assert_eq!(view.uniform_bytes, 3 * 64 + 16);

    let expected = extract_pose(&relocate(
        world.portal(a).unwrap().pose(),
        world.portal(b).unwrap().pose(),
        &viewer.pose().local_to_world(),
    ));
    assert!((view.camera_pose.position - expected.position).length() < 1e-5);
}

#[test]
fn test_integration_virtual_camera_round_trip() {
    let (world, a, b) = create_scenario(PortalConfig::default());
    let pose_a = *world.portal(a).unwrap().pose();
    let pose_b = *world.portal(b).unwrap().pose();

    let viewer = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_x(0.3));
    let through = relocate(&pose_a, &pose_b, &viewer.local_to_world());
    let back = relocate(&pose_b, &pose_a, &through);

    assert!(back.abs_diff_eq(viewer.local_to_world(), 1e-4));
}

#[test]
fn test_integration_viewer_walking_around() {
    let (mut world, _, _) = create_scenario(PortalConfig::default().with_render_order(RenderOrder::Priority));
    let mut renderer = RecordingRenderer::new();

    let mut total = FrameStats::default();
    for step in 0..20 {
        let x = step as f32;
        let viewer = viewer_at(Vec3::new(x, 0.0, 20.0));
        let stats = world.render_frame(&viewer, &mut renderer).unwrap();
        total.rendered += stats.rendered;
        total.culled += stats.culled;
    }

    // Every portal is either rendered or culled, never skipped
    assert_eq!(total.rendered + total.culled, 40);
    assert!(total.rendered > 0);
    assert_eq!(renderer.allocations, 2);
    assert!(renderer.views.iter().all(|v| v.visible_surfaces.len() == 1));
}

#[test]
fn test_integration_render_failure_recovers() {
    let (mut world, _, b) = create_scenario(PortalConfig::default());
    let mut renderer = RecordingRenderer::new();
    let viewer = viewer_at(Vec3::new(0.0, 0.0, 5.0));

    renderer.fail_render = true;
    let stats = world.render_frame(&viewer, &mut renderer).unwrap();
    assert_eq!(stats.skipped, 1);
    assert!(world.portal(b).unwrap().surface().is_enabled());

    renderer.fail_render = false;
    let stats = world.render_frame(&viewer, &mut renderer).unwrap();
    assert_eq!(stats.rendered, 1);
    assert_eq!(renderer.allocations, 1);
}

#[test]
fn test_integration_textures_released_on_teardown() {
    let mut renderer = RecordingRenderer::new();
    {
        let (mut world, _, _) = create_scenario(PortalConfig::default());
        world.render_frame(&viewer_at(Vec3::new(5.0, 0.0, 30.0)), &mut renderer).unwrap();
        assert_eq!(renderer.live_textures(), 2);
    }
    assert_eq!(renderer.live_textures(), 0);
}

#[test]
fn test_integration_broken_link_detected_before_render() {
    let (mut world, a, _) = create_scenario(PortalConfig::default());
    let mut renderer = RecordingRenderer::new();
    world.unlink(a).unwrap();

    let result = world.render_frame(&viewer_at(Vec3::new(0.0, 0.0, 5.0)), &mut renderer);

    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    assert!(matches!(world.validate(), Err(Error::InvalidConfiguration(_))));
    assert_eq!(renderer.allocations, 0);
}

// ============================================================================
// Travellers
// ============================================================================

#[test]
fn test_integration_traveller_walks_through_portal() {
    let (mut world, a, b) = create_scenario(PortalConfig::default());
    let key = world.add_traveller(Box::new(RigidTraveller::new(Pose::from_position(Vec3::new(0.0, 0.0, 1.0)))));
    world.on_enter_threshold(a, key).unwrap();

    let mut teleports = Vec::new();
    for _ in 0..10 {
        // Walk forward in the traveller's own frame
        let traveller = world.traveller_mut(key).unwrap();
        let mut pose = traveller.pose();
        pose.position += pose.rotation * Vec3::new(0.0, 0.0, -0.3);
        traveller.set_pose(pose);

        teleports.extend(world.update_travellers().unwrap());
    }

    assert_eq!(teleports.len(), 1);
    assert_eq!(teleports[0].from, a);
    assert_eq!(teleports[0].to, b);
    assert_eq!(world.tracking_portal(key), Some(a));

    // Ends up walking away from B along +Z
    let pose = world.traveller(key).unwrap().pose();
    assert!((pose.position.x - 10.0).abs() < 1e-3);
    assert!(pose.position.z > 1.0);
}

#[test]
fn test_integration_body_keeps_momentum() {
    let (mut world, a, _) = create_scenario(PortalConfig::default());
    let body = BodyTraveller::new(Pose::from_position(Vec3::new(0.0, 0.0, 0.05)), Vec3::new(0.0, 0.0, -1.0));
    let key = world.add_traveller(Box::new(body));
    world.on_enter_threshold(a, key).unwrap();

    let traveller = world.traveller_mut(key).unwrap();
    traveller.set_pose(Pose::from_position(Vec3::new(0.0, 0.0, -0.05)));
    let events = world.update_travellers().unwrap();

    assert_eq!(events.len(), 1);
    let removed = world.remove_traveller(key).unwrap();
    assert!((removed.pose().position - Vec3::new(10.0, 0.0, 0.05)).length() < 1e-4);
}

#[test]
fn test_integration_traveller_handed_between_portals() {
    let (mut world, a, b) = create_scenario(PortalConfig::default());
    let key = world.add_traveller(Box::new(RigidTraveller::new(Pose::from_position(Vec3::new(10.0, 0.0, -1.0)))));

    world.on_enter_threshold(a, key).unwrap();
    world.on_enter_threshold(b, key).unwrap();

    assert_eq!(world.tracking_portal(key), Some(b));
    assert!(world.portal(a).unwrap().tracker().is_empty());
    assert_eq!(world.portal(b).unwrap().tracker().len(), 1);
}
