/// Mock Renderer for unit tests (no GPU required)
///
/// Counts texture allocations and releases, records every rendered view and
/// can be told to fail allocation or rendering.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use glam::Mat4;

use crate::camera::RenderView;
use crate::engine_bail;
use crate::error::Result;
use crate::math::Pose;
use crate::portal::PortalKey;
use crate::renderer::{Renderer, Texture, TextureDesc, TextureInfo};

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
    pub id: usize,
    released: Arc<AtomicUsize>,
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

impl Drop for MockTexture {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock Renderer
// ============================================================================

/// One `render_view` call as seen by the mock.
#[derive(Debug, Clone)]
pub struct RenderedView {
    pub portal: PortalKey,
    pub camera_pose: Pose,
    pub projection: Mat4,
    pub visible_surfaces: Vec<PortalKey>,
    pub target_size: (u32, u32),
}

#[derive(Debug, Default)]
pub struct MockRenderer {
    pub allocations: usize,
    pub rendered: Vec<RenderedView>,
    pub fail_allocation: bool,
    pub fail_render: bool,
    released: Arc<AtomicUsize>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of textures dropped so far.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Textures allocated and not yet dropped.
    pub fn live_textures(&self) -> usize {
        self.allocations - self.released()
    }
}

impl Renderer for MockRenderer {
    fn create_view_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture>> {
        if self.fail_allocation {
            engine_bail!("portal3d::MockRenderer", "Simulated allocation failure ({}x{})", desc.width, desc.height);
        }

        self.allocations += 1;
        Ok(Arc::new(MockTexture {
            info: TextureInfo::from(desc),
            id: self.allocations,
            released: Arc::clone(&self.released),
        }))
    }

    fn render_view(&mut self, view: &RenderView, target: &Arc<dyn Texture>) -> Result<()> {
        if self.fail_render {
            engine_bail!("portal3d::MockRenderer", "Simulated render failure");
        }

        let info = target.info();
        self.rendered.push(RenderedView {
            portal: view.portal(),
            camera_pose: *view.camera().pose(),
            projection: *view.camera().projection_matrix(),
            visible_surfaces: view.visible_surfaces().to_vec(),
            target_size: (info.width, info.height),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_renderer_tests.rs"]
mod tests;
