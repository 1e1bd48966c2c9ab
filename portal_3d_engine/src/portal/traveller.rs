/// Travellers: entities that can pass through portals.
///
/// The world stores travellers as `Box<dyn Traveller>`; game code supplies
/// its own implementations or uses the two provided here.

use glam::{Quat, Vec3};
use slotmap::new_key_type;
use crate::math::Pose;
use super::portal::PortalKey;

new_key_type! {
    /// Stable key for a traveller registered in a `PortalWorld`.
    pub struct TravellerKey;
}

/// One side of a teleport: which portal, and where it was at the time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalEndpoint {
    pub key: PortalKey,
    pub pose: Pose,
}

/// An entity tracked by portals and relocated when it crosses one.
pub trait Traveller {
    /// Current world pose.
    fn pose(&self) -> Pose;

    fn set_pose(&mut self, pose: Pose);

    /// Move to the relocated pose after crossing `from` and coming out of `to`.
    fn teleport(&mut self, from: &PortalEndpoint, to: &PortalEndpoint, position: Vec3, rotation: Quat) {
        let _ = (from, to);
        self.set_pose(Pose::new(position, rotation));
    }

    /// Called when a portal starts tracking this traveller.
    fn enter_portal_threshold(&mut self) {}

    /// Called when a portal stops tracking this traveller.
    fn exit_portal_threshold(&mut self) {}
}

// ===== RIGID TRAVELLER =====

/// Pose-only traveller (props, cameras).
#[derive(Debug, Clone, Default)]
pub struct RigidTraveller {
    pose: Pose,
    in_threshold: bool,
    teleports: u32,
}

impl RigidTraveller {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            in_threshold: false,
            teleports: 0,
        }
    }

    pub fn is_in_threshold(&self) -> bool {
        self.in_threshold
    }

    /// Number of teleports performed so far.
    pub fn teleports(&self) -> u32 {
        self.teleports
    }
}

impl Traveller for RigidTraveller {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    fn teleport(&mut self, _from: &PortalEndpoint, _to: &PortalEndpoint, position: Vec3, rotation: Quat) {
        self.pose = Pose::new(position, rotation);
        self.teleports += 1;
    }

    fn enter_portal_threshold(&mut self) {
        self.in_threshold = true;
    }

    fn exit_portal_threshold(&mut self) {
        self.in_threshold = false;
    }
}

// ===== BODY TRAVELLER =====

/// Traveller with a linear velocity that keeps its momentum through portals.
///
/// On teleport the velocity is rotated by the rotation between the two
/// portals, so a body falling into one portal comes out of the other moving
/// along the exit portal's frame.
#[derive(Debug, Clone, Default)]
pub struct BodyTraveller {
    pose: Pose,
    velocity: Vec3,
    in_threshold: bool,
}

impl BodyTraveller {
    pub fn new(pose: Pose, velocity: Vec3) -> Self {
        Self {
            pose,
            velocity,
            in_threshold: false,
        }
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    pub fn is_in_threshold(&self) -> bool {
        self.in_threshold
    }

    /// Advance the position by `velocity * dt`.
    pub fn integrate(&mut self, dt: f32) {
        self.pose.position += self.velocity * dt;
    }
}

impl Traveller for BodyTraveller {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    fn teleport(&mut self, from: &PortalEndpoint, to: &PortalEndpoint, position: Vec3, rotation: Quat) {
        let relative = (to.pose.rotation * from.pose.rotation.conjugate()).normalize();
        self.velocity = relative * self.velocity;
        self.pose = Pose::new(position, rotation);
    }

    fn enter_portal_threshold(&mut self) {
        self.in_threshold = true;
    }

    fn exit_portal_threshold(&mut self) {
        self.in_threshold = false;
    }
}

#[cfg(test)]
#[path = "traveller_tests.rs"]
mod tests;
