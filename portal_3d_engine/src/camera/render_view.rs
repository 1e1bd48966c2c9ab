/// RenderView: what a renderer needs to draw one portal view.
///
/// Built by `PortalWorld::render_portal()`. Contains a snapshot of the
/// portal's virtual camera and the display surfaces that may be drawn
/// (the rendering portal's own surface is excluded).
///
/// Ephemeral: lives for one render call.

use crate::portal::PortalKey;
use crate::renderer::ViewUniform;
use super::camera::Camera;

/// Snapshot handed to `Renderer::render_view`.
#[derive(Debug, Clone)]
pub struct RenderView {
    portal: PortalKey,
    camera: Camera,
    visible_surfaces: Vec<PortalKey>,
}

impl RenderView {
    /// Create a new RenderView (crate-internal: only the portal world creates these).
    pub(crate) fn new(portal: PortalKey, camera: Camera, visible_surfaces: Vec<PortalKey>) -> Self {
        Self {
            portal,
            camera,
            visible_surfaces,
        }
    }

    /// Portal whose view is being rendered.
    pub fn portal(&self) -> PortalKey {
        self.portal
    }

    /// Virtual camera snapshot (pose + possibly oblique projection).
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Portals whose display surface is enabled for this render.
    pub fn visible_surfaces(&self) -> &[PortalKey] {
        &self.visible_surfaces
    }

    /// Whether the display surface of `portal` may be drawn in this view.
    pub fn is_surface_visible(&self, portal: PortalKey) -> bool {
        self.visible_surfaces.contains(&portal)
    }

    /// GPU-ready camera constants for this view.
    pub fn uniform(&self) -> ViewUniform {
        ViewUniform::from_camera(&self.camera)
    }
}

#[cfg(test)]
#[path = "render_view_tests.rs"]
mod tests;
