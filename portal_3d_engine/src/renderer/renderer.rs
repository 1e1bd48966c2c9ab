/// Renderer trait - the backend interface portals render through

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::camera::{Camera, RenderView};
use crate::error::Result;
use crate::renderer::{Texture, TextureDesc};

// ============================================================================
// Viewport
// ============================================================================

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-target viewport of `width` x `height` pixels, depth range [0, 1].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Pixel size of a texture covering this viewport (at least 1x1).
    pub fn extent(&self) -> (u32, u32) {
        let to_pixels = |v: f32| {
            if v.is_finite() && v >= 1.0 {
                v.round() as u32
            } else {
                1
            }
        };
        (to_pixels(self.width), to_pixels(self.height))
    }

    /// Width / height ratio, 1.0 for degenerate sizes.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 && self.width > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

// ============================================================================
// ViewUniform
// ============================================================================

/// Per-view camera constants, laid out for direct GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ViewUniform {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    /// xyz = camera world position, w = 1
    pub camera_position: Vec4,
}

impl ViewUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view: camera.view_matrix(),
            projection: *camera.projection_matrix(),
            view_projection: camera.view_projection_matrix(),
            camera_position: camera.position().extend(1.0),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

// ============================================================================
// Renderer trait
// ============================================================================

/// Backend used by `PortalWorld` to render portal views.
///
/// Implementations own the GPU. Textures returned by `create_view_texture`
/// release their memory when the last `Arc` is dropped.
pub trait Renderer {
    /// Allocate a texture that can be rendered into and sampled.
    fn create_view_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Render the scene as seen by `view.camera()` into `target`.
    ///
    /// Only the display surfaces listed in `view.visible_surfaces()` may be drawn.
    fn render_view(&mut self, view: &RenderView, target: &Arc<dyn Texture>) -> Result<()>;
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
