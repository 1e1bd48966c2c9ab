//! GPU textures as seen by the portal layer.
//!
//! Each portal owns one view texture: the virtual camera renders into it and
//! the linked portal's surface samples it. Backends implement [`Texture`];
//! the GPU memory goes away when the last `Arc` is dropped.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    /// HDR view targets
    R16G16B16A16_SFLOAT,
}

impl TextureFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R16G16B16A16_SFLOAT => 8,
            _ => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    Sampled,
    RenderTarget,
    SampledAndRenderTarget,
}

impl TextureUsage {
    pub fn is_sampled(self) -> bool {
        matches!(self, TextureUsage::Sampled | TextureUsage::SampledAndRenderTarget)
    }

    pub fn is_render_target(self) -> bool {
        matches!(self, TextureUsage::RenderTarget | TextureUsage::SampledAndRenderTarget)
    }

    /// True when a texture created with `self` supports everything `needed` asks for.
    pub fn covers(self, needed: TextureUsage) -> bool {
        (!needed.is_sampled() || self.is_sampled())
            && (!needed.is_render_target() || self.is_render_target())
    }
}

/// Creation parameters passed to `Renderer::create_view_texture`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl TextureDesc {
    /// Render-then-sample target of at least 1x1 pixels.
    pub fn view_target(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            format,
            usage: TextureUsage::SampledAndRenderTarget,
        }
    }

    pub fn size_in_bytes(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * u64::from(self.format.bytes_per_pixel())
    }
}

/// What a backend reports about a texture it created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl TextureInfo {
    pub fn has_size(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }

    /// Whether this texture can stand in for a fresh allocation of `desc`.
    pub fn can_back(&self, desc: &TextureDesc) -> bool {
        self.has_size(desc.width, desc.height)
            && self.format == desc.format
            && self.usage.covers(desc.usage)
    }
}

impl From<&TextureDesc> for TextureInfo {
    fn from(desc: &TextureDesc) -> Self {
        Self {
            width: desc.width,
            height: desc.height,
            format: desc.format,
            usage: desc.usage,
        }
    }
}

pub trait Texture: Send + Sync {
    fn info(&self) -> &TextureInfo;
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
