//! Math module: rigid poses, transform composition and bounding boxes.
//!
//! Pure functions and plain `Copy` data; nothing in here holds state.

mod aabb;
mod pose;

pub use aabb::AABB;
pub use pose::{
    Pose,
    compose, relocate, extract_translation, extract_rotation, extract_pose,
};
