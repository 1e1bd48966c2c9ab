use glam::{Mat4, Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};
use super::*;

fn assert_vec3_near(actual: Vec3, expected: Vec3) {
    assert!(
        (actual - expected).length() < 1e-4,
        "expected {:?}, got {:?}", expected, actual
    );
}

/// Quaternions q and -q describe the same rotation.
fn assert_quat_near(actual: Quat, expected: Quat) {
    assert!(
        actual.dot(expected).abs() > 1.0 - 1e-5,
        "expected {:?}, got {:?}", expected, actual
    );
}

fn portal_a() -> Pose {
    Pose::IDENTITY
}

fn portal_b() -> Pose {
    Pose::new(Vec3::new(10.0, 0.0, 0.0), Quat::from_rotation_y(PI))
}

// ============================================================================
// Pose basics
// ============================================================================

#[test]
fn test_identity_pose_matrices() {
    assert_eq!(Pose::IDENTITY.local_to_world(), Mat4::IDENTITY);
    assert_eq!(Pose::IDENTITY.world_to_local(), Mat4::IDENTITY);
    assert_eq!(Pose::default(), Pose::IDENTITY);
}

#[test]
fn test_world_to_local_inverts_local_to_world() {
    let pose = Pose::new(
        Vec3::new(3.0, -2.0, 7.5),
        Quat::from_euler(glam::EulerRot::YXZ, 0.4, -1.1, 0.25),
    );
    let product = pose.local_to_world() * pose.world_to_local();

    assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));
}

#[test]
fn test_forward_is_local_z() {
    assert_vec3_near(Pose::IDENTITY.forward(), Vec3::Z);
    assert_vec3_near(portal_b().forward(), Vec3::NEG_Z);

    let turned = Pose::new(Vec3::ZERO, Quat::from_rotation_y(FRAC_PI_2));
    assert_vec3_near(turned.forward(), Vec3::X);
    assert_vec3_near(turned.up(), Vec3::Y);
    assert_vec3_near(turned.right(), Vec3::NEG_Z);
}

#[test]
fn test_transform_point_round_trip() {
    let pose = portal_b();
    let local = Vec3::new(1.0, 2.0, 3.0);
    let world = pose.transform_point(local);

    assert_vec3_near(world, Vec3::new(9.0, 2.0, -3.0));
    assert_vec3_near(pose.inverse_transform_point(world), local);
}

#[test]
fn test_is_finite() {
    assert!(portal_b().is_finite());
    assert!(!Pose::from_position(Vec3::new(f32::NAN, 0.0, 0.0)).is_finite());
}

// ============================================================================
// compose / relocate
// ============================================================================

#[test]
fn test_compose_applies_inner_first() {
    let translate = Mat4::from_translation(Vec3::X);
    let rotate = Mat4::from_rotation_y(FRAC_PI_2);

    let m = compose(&translate, &rotate);
    let p = m.transform_point3(Vec3::Z);

    // Rotate Z → X, then translate by X
    assert_vec3_near(p, Vec3::new(2.0, 0.0, 0.0));
}

#[test]
fn test_relocate_matches_explicit_product() {
    let viewer = Pose::new(Vec3::new(1.0, 1.5, -4.0), Quat::from_rotation_y(0.3));
    let expected = portal_b().local_to_world()
        * portal_a().world_to_local()
        * viewer.local_to_world();

    let m = relocate(&portal_a(), &portal_b(), &viewer.local_to_world());

    assert!(m.abs_diff_eq(expected, 1e-5));
}

#[test]
fn test_relocate_through_both_portals_returns_original_pose() {
    let viewer = Pose::new(
        Vec3::new(-1.25, 1.7, 3.0),
        Quat::from_euler(glam::EulerRot::YXZ, 2.1, 0.2, 0.0),
    );

    // Viewer teleports through A and arrives at B
    let teleported = extract_pose(&relocate(&portal_a(), &portal_b(), &viewer.local_to_world()));
    // Virtual camera of A (linked to B) for the post-teleport viewer
    let virtual_camera = extract_pose(&relocate(&portal_b(), &portal_a(), &teleported.local_to_world()));

    assert_vec3_near(virtual_camera.position, viewer.position);
    assert_quat_near(virtual_camera.rotation, viewer.rotation);
}

#[test]
fn test_relocate_scenario_lands_at_linked_portal_rotated_half_turn() {
    let incoming = Quat::from_rotation_y(0.0);
    let traveller = Pose::new(Vec3::new(0.0, 0.0, 0.01), incoming);

    let m = relocate(&portal_a(), &portal_b(), &traveller.local_to_world());
    let target = extract_pose(&m);

    assert_vec3_near(target.position, Vec3::new(10.0, 0.0, -0.01));
    assert_quat_near(target.rotation, Quat::from_rotation_y(PI) * incoming);
}

// ============================================================================
// extract_translation / extract_rotation
// ============================================================================

#[test]
fn test_extract_translation_is_fourth_column() {
    let m = Mat4::from_scale_rotation_translation(
        Vec3::splat(2.0),
        Quat::from_rotation_x(0.7),
        Vec3::new(4.0, 5.0, 6.0),
    );

    assert_eq!(extract_translation(&m), Vec3::new(4.0, 5.0, 6.0));
}

#[test]
fn test_extract_rotation_removes_scale() {
    let rotation = Quat::from_euler(glam::EulerRot::XYZ, 0.3, -0.8, 1.2);
    let m = Mat4::from_scale_rotation_translation(
        Vec3::new(3.0, 0.5, 2.0),
        rotation,
        Vec3::ONE,
    );

    assert_quat_near(extract_rotation(&m), rotation);
}

#[test]
fn test_extract_rotation_fixes_mirrored_basis() {
    let mirrored = Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0));
    let q = extract_rotation(&mirrored);

    assert!((q.length() - 1.0).abs() < 1e-5);
    assert_quat_near(q, Quat::IDENTITY);
}

#[test]
fn test_extract_rotation_degenerate_falls_back_to_identity() {
    let flat = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
    assert_eq!(extract_rotation(&flat), Quat::IDENTITY);

    let nan = Mat4::from_cols_array(&[f32::NAN; 16]);
    assert_eq!(extract_rotation(&nan), Quat::IDENTITY);
}

#[test]
fn test_extract_pose_round_trip() {
    let pose = Pose::new(Vec3::new(-3.0, 2.0, 9.0), Quat::from_rotation_z(1.0));
    let extracted = extract_pose(&pose.local_to_world());

    assert_vec3_near(extracted.position, pose.position);
    assert_quat_near(extracted.rotation, pose.rotation);
}
