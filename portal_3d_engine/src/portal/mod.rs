//! Portal module: linked portals, their display surfaces and travellers.
//!
//! `PortalWorld` is the entry point: it owns the portals, renders their views
//! each frame and relocates travellers crossing a portal plane.

mod crossing;
mod portal;
mod surface;
mod traveller;
mod world;

pub use crossing::{CrossingTracker, TeleportEvent, TrackedTraveller, signed_offset};
pub use portal::{Portal, PortalKey};
pub use surface::{
    DisplaySurface, Material, protect_screen_from_clipping,
    MAIN_TEXTURE, DEFAULT_SURFACE_THICKNESS,
};
pub use traveller::{BodyTraveller, PortalEndpoint, RigidTraveller, Traveller, TravellerKey};
pub use world::{FrameStats, PortalWorld, RenderOutcome};
