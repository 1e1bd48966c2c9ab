/// Portal rendering configuration

use crate::camera::{DEFAULT_NEAR_CLIP_LIMIT, DEFAULT_NEAR_CLIP_OFFSET};
use crate::engine_config_err;
use crate::error::Result;
use crate::renderer::TextureFormat;

/// Order in which `PortalWorld::render_frame` visits portals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderOrder {
    /// Order of `add_portal` calls
    #[default]
    Registration,
    /// Ascending `Portal::priority`, ties broken by registration order
    Priority,
}

/// Settings shared by every portal of a `PortalWorld`
#[derive(Debug, Clone, PartialEq)]
pub struct PortalConfig {
    /// Extra distance added to the oblique clip plane so geometry sitting
    /// right behind the portal is not cut
    pub near_clip_offset: f32,
    /// Below this camera-to-plane distance the plain projection is used
    pub near_clip_limit: f32,
    /// Thicken display surfaces after rendering so the viewer's near plane
    /// never slices through them
    pub protect_screen_from_clipping: bool,
    /// Additional full render passes per frame (recursive views)
    pub extra_bounce_passes: u32,
    pub render_order: RenderOrder,
    pub view_texture_format: TextureFormat,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            near_clip_offset: DEFAULT_NEAR_CLIP_OFFSET,
            near_clip_limit: DEFAULT_NEAR_CLIP_LIMIT,
            protect_screen_from_clipping: true,
            extra_bounce_passes: 0,
            render_order: RenderOrder::Registration,
            view_texture_format: TextureFormat::R8G8B8A8_UNORM,
        }
    }
}

impl PortalConfig {
    pub fn with_near_clip_offset(mut self, offset: f32) -> Self {
        self.near_clip_offset = offset;
        self
    }

    pub fn with_near_clip_limit(mut self, limit: f32) -> Self {
        self.near_clip_limit = limit;
        self
    }

    pub fn with_screen_clipping_protection(mut self, enabled: bool) -> Self {
        self.protect_screen_from_clipping = enabled;
        self
    }

    pub fn with_extra_bounce_passes(mut self, passes: u32) -> Self {
        self.extra_bounce_passes = passes;
        self
    }

    pub fn with_render_order(mut self, order: RenderOrder) -> Self {
        self.render_order = order;
        self
    }

    pub fn with_view_texture_format(mut self, format: TextureFormat) -> Self {
        self.view_texture_format = format;
        self
    }

    /// Total render passes per frame
    pub fn passes_per_frame(&self) -> u32 {
        self.extra_bounce_passes.saturating_add(1)
    }

    /// Reject negative or non-finite clip distances.
    pub fn validate(&self) -> Result<()> {
        if !self.near_clip_offset.is_finite() || self.near_clip_offset < 0.0 {
            return Err(engine_config_err!("portal3d::PortalConfig",
                "near_clip_offset must be finite and >= 0 (got {})", self.near_clip_offset));
        }
        if !self.near_clip_limit.is_finite() || self.near_clip_limit < 0.0 {
            return Err(engine_config_err!("portal3d::PortalConfig",
                "near_clip_limit must be finite and >= 0 (got {})", self.near_clip_limit));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
