/// Renderer module - the backend seam used by portal rendering

mod renderer;
mod texture;

#[cfg(test)]
pub(crate) mod mock_renderer;

pub use renderer::{Renderer, Viewport, ViewUniform};
pub use texture::{Texture, TextureDesc, TextureFormat, TextureInfo, TextureUsage};
