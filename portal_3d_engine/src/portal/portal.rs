/// Portal: one end of a linked pair.
///
/// Holds everything a single portal owns: its pose, the key of its partner,
/// its display surface, the virtual camera rendering the partner's side, the
/// view texture that camera renders into and the travellers near its plane.

use std::fmt;
use std::sync::Arc;
use slotmap::new_key_type;

use crate::camera::{Camera, Projection};
use crate::engine_debug;
use crate::error::Result;
use crate::math::Pose;
use crate::renderer::{Renderer, Texture, TextureDesc, TextureFormat, Viewport};
use super::crossing::CrossingTracker;
use super::surface::DisplaySurface;

new_key_type! {
    /// Stable key for a Portal within a PortalWorld.
    ///
    /// Keys remain valid even after other portals are removed.
    pub struct PortalKey;
}

pub struct Portal {
    name: String,
    pose: Pose,
    linked: Option<PortalKey>,
    priority: i32,
    surface: DisplaySurface,
    /// Virtual camera, re-derived from the viewer on every render
    camera: Camera,
    /// Exclusively written by this portal, displayed by the linked one
    view_texture: Option<Arc<dyn Texture>>,
    tracker: CrossingTracker,
}

impl Portal {
    pub(crate) fn new(name: String, pose: Pose, surface: DisplaySurface) -> Self {
        Self {
            name,
            pose,
            linked: None,
            priority: 0,
            surface,
            camera: Camera::new(pose, Projection::default(), Viewport::new(1, 1)),
            view_texture: None,
            tracker: CrossingTracker::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn linked(&self) -> Option<PortalKey> {
        self.linked
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn surface(&self) -> &DisplaySurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DisplaySurface {
        &mut self.surface
    }

    /// Virtual camera state from the last render.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn view_texture(&self) -> Option<&Arc<dyn Texture>> {
        self.view_texture.as_ref()
    }

    pub fn tracker(&self) -> &CrossingTracker {
        &self.tracker
    }

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub(crate) fn set_linked(&mut self, linked: Option<PortalKey>) {
        self.linked = linked;
    }

    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub(crate) fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub(crate) fn tracker_mut(&mut self) -> &mut CrossingTracker {
        &mut self.tracker
    }

    /// Return a view texture matching `viewport`, allocating a new one only
    /// when there is none or its size or format differ.
    ///
    /// On allocation failure the current texture is kept.
    pub(crate) fn ensure_view_texture(
        &mut self,
        renderer: &mut dyn Renderer,
        viewport: &Viewport,
        format: TextureFormat,
    ) -> Result<Arc<dyn Texture>> {
        let (width, height) = viewport.extent();
        let desc = TextureDesc::view_target(width, height, format);

        if let Some(texture) = &self.view_texture {
            if texture.info().can_back(&desc) {
                return Ok(Arc::clone(texture));
            }
        }

        let texture = renderer.create_view_texture(&desc)?;
        engine_debug!("portal3d::Portal", "Portal '{}' view texture allocated ({}x{})",
            self.name, desc.width, desc.height);

        // Replacing drops our handle to the previous texture
        self.view_texture = Some(Arc::clone(&texture));
        Ok(texture)
    }

    /// Give up the view texture (the linked surface may still hold a clone).
    pub(crate) fn release_view_texture(&mut self) -> Option<Arc<dyn Texture>> {
        self.view_texture.take()
    }
}

impl fmt::Debug for Portal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Portal")
            .field("name", &self.name)
            .field("pose", &self.pose)
            .field("linked", &self.linked)
            .field("priority", &self.priority)
            .field("surface", &self.surface)
            .field("view_texture", &self.view_texture.as_ref().map(|t| t.info().clone()))
            .field("tracked", &self.tracker.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "portal_tests.rs"]
mod tests;
