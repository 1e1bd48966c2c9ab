//! Camera module: camera, frustum, visibility and oblique clipping.
//!
//! The viewer camera is owned and driven by the caller. Each portal owns a
//! virtual camera whose pose and projection are derived from the viewer's
//! every frame and are never authored directly.

mod camera;
mod clip_plane;
mod frustum;
mod render_view;
mod visibility;

pub use camera::{Camera, Projection};
pub use clip_plane::{
    ClipPlane, portal_clip_plane, compute_oblique_projection, apply_oblique_clip,
    DEFAULT_NEAR_CLIP_OFFSET, DEFAULT_NEAR_CLIP_LIMIT,
};
pub use frustum::{
    Frustum,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use render_view::RenderView;
pub use visibility::{is_visible, is_visible_from};
