/// Crossing detection for travellers near a portal.
///
/// A portal tracks the travellers inside its trigger threshold and compares
/// which side of its plane they are on from one update to the next. A side
/// change means the traveller passed through and is relocated to the
/// linked portal.

use glam::{Quat, Vec3};
use slotmap::SlotMap;
use crate::engine_debug;
use crate::math::{Pose, extract_rotation, extract_translation, relocate};
use super::portal::PortalKey;
use super::traveller::{PortalEndpoint, Traveller, TravellerKey};

/// Signed distance of `point` from the portal plane along the portal forward axis.
pub fn signed_offset(portal_pose: &Pose, point: Vec3) -> f32 {
    portal_pose.forward().dot(point - portal_pose.position)
}

fn side_of(offset: f32) -> i8 {
    if offset > 0.0 {
        1
    } else if offset < 0.0 {
        -1
    } else {
        0
    }
}

/// Per-traveller crossing state, relative to one portal plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedTraveller {
    pub key: TravellerKey,
    /// Offset observed at the last evaluation
    pub previous_offset: f32,
    /// Sign of the last non-zero offset (0 until one is seen)
    pub last_side: i8,
}

impl TrackedTraveller {
    fn new(key: TravellerKey, offset: f32) -> Self {
        Self {
            key,
            previous_offset: offset,
            last_side: side_of(offset),
        }
    }

    /// Whether moving to `offset` crosses the plane. Zero never counts.
    pub fn crosses(&self, offset: f32) -> bool {
        let side = side_of(offset);
        side != 0 && self.last_side != 0 && side != self.last_side
    }

    fn record(&mut self, offset: f32) {
        self.previous_offset = offset;
        let side = side_of(offset);
        if side != 0 {
            self.last_side = side;
        }
    }

    fn reset(&mut self, offset: f32) {
        self.previous_offset = offset;
        self.last_side = side_of(offset);
    }
}

/// Result of one teleport performed by `CrossingTracker::update`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleportEvent {
    pub traveller: TravellerKey,
    pub from: PortalKey,
    pub to: PortalKey,
    pub position: Vec3,
    pub rotation: Quat,
}

/// Set of travellers currently inside one portal's threshold.
#[derive(Debug, Clone, Default)]
pub struct CrossingTracker {
    tracked: Vec<TrackedTraveller>,
}

impl CrossingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: TravellerKey) -> bool {
        self.tracked.iter().any(|t| t.key == key)
    }

    pub fn get(&self, key: TravellerKey) -> Option<&TrackedTraveller> {
        self.tracked.iter().find(|t| t.key == key)
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Tracked travellers in the order they entered.
    pub fn tracked(&self) -> &[TrackedTraveller] {
        &self.tracked
    }

    /// Start tracking `key`. No-op (returns false) if already tracked.
    pub fn on_enter_threshold(
        &mut self,
        key: TravellerKey,
        traveller: &mut dyn Traveller,
        portal_pose: &Pose,
    ) -> bool {
        if self.contains(key) {
            return false;
        }

        traveller.enter_portal_threshold();
        let offset = signed_offset(portal_pose, traveller.pose().position);
        self.tracked.push(TrackedTraveller::new(key, offset));
        true
    }

    /// Stop tracking `key`. No-op (returns false) if not tracked.
    pub fn on_exit_threshold(&mut self, key: TravellerKey, traveller: &mut dyn Traveller) -> bool {
        if !self.forget(key) {
            return false;
        }

        traveller.exit_portal_threshold();
        true
    }

    /// Drop `key` without notifying the traveller (it no longer exists).
    pub fn forget(&mut self, key: TravellerKey) -> bool {
        let before = self.tracked.len();
        self.tracked.retain(|t| t.key != key);
        self.tracked.len() != before
    }

    pub fn clear(&mut self) {
        self.tracked.clear();
    }

    /// Evaluate every tracked traveller once and teleport those that crossed
    /// the plane of `from` to the matching pose behind `to`.
    ///
    /// Entries whose traveller no longer exists are dropped.
    pub fn update(
        &mut self,
        from: &PortalEndpoint,
        to: &PortalEndpoint,
        travellers: &mut SlotMap<TravellerKey, Box<dyn Traveller>>,
    ) -> Vec<TeleportEvent> {
        let mut events = Vec::new();

        self.tracked.retain(|t| travellers.contains_key(t.key));

        for entry in &mut self.tracked {
            let Some(traveller) = travellers.get_mut(entry.key) else {
                continue;
            };

            let current = signed_offset(&from.pose, traveller.pose().position);
            if !entry.crosses(current) {
                entry.record(current);
                continue;
            }

            let relocated = relocate(&from.pose, &to.pose, &traveller.pose().local_to_world());
            let position = extract_translation(&relocated);
            let rotation = extract_rotation(&relocated);
            traveller.teleport(from, to, position, rotation);

            // Same portal plane as before: the traveller stays tracked here
            entry.reset(signed_offset(&from.pose, traveller.pose().position));

            engine_debug!("portal3d::CrossingTracker",
                "Traveller {:?} teleported to ({:.3}, {:.3}, {:.3})",
                entry.key, position.x, position.y, position.z);

            events.push(TeleportEvent {
                traveller: entry.key,
                from: from.key,
                to: to.key,
                position,
                rotation,
            });
        }

        events
    }
}

#[cfg(test)]
#[path = "crossing_tests.rs"]
mod tests;
