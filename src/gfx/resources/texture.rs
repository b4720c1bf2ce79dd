//! 纹理资源

use crate::resource::{AsyncResource, Locator, ResourceKind};

/// 像素格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    R8,
    RGBA8,
    RGBA16F,
    RGBA32F,
    Depth,
    DepthStencil,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::R8 => 1,
            PixelFormat::RGBA8 | PixelFormat::Depth | PixelFormat::DepthStencil => 4,
            PixelFormat::RGBA16F => 8,
            PixelFormat::RGBA32F => 16,
        }
    }

    pub fn is_depth(&self) -> bool {
        matches!(self, PixelFormat::Depth | PixelFormat::DepthStencil)
    }
}

/// 纹理用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    /// 采样纹理，数据在创建时提供
    Immutable,
    /// 渲染目标，没有初始数据
    RenderTarget,
}

/// 纹理创建参数
#[derive(Debug, Clone)]
pub struct TextureSetup {
    pub locator: Locator,
    pub width: u32,
    pub height: u32,
    pub num_mipmaps: u32,
    pub format: PixelFormat,
    pub usage: TextureUsage,
}

impl TextureSetup {
    /// 从像素数据创建单级纹理
    pub fn from_pixel_data(locator: impl Into<Locator>, width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            locator: locator.into(),
            width,
            height,
            num_mipmaps: 1,
            format,
            usage: TextureUsage::Immutable,
        }
    }

    /// 创建渲染目标
    pub fn render_target(locator: impl Into<Locator>, width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            locator: locator.into(),
            width,
            height,
            num_mipmaps: 1,
            format,
            usage: TextureUsage::RenderTarget,
        }
    }

    pub fn with_mipmaps(mut self, num_mipmaps: u32) -> Self {
        self.num_mipmaps = num_mipmaps;
        self
    }

    /// 全部 mip 级别的字节数，溢出时返回 `None`
    pub fn byte_size(&self) -> Option<usize> {
        let bpp = self.format.bytes_per_pixel();
        let (mut w, mut h) = (self.width as usize, self.height as usize);
        let mut total: usize = 0;
        for _ in 0..self.num_mipmaps {
            let level = w.checked_mul(h)?.checked_mul(bpp)?;
            total = total.checked_add(level)?;
            w = (w / 2).max(1);
            h = (h / 2).max(1);
        }
        Some(total)
    }
}

/// 纹理资源
#[derive(Debug)]
pub struct Texture {
    setup: TextureSetup,
    gpu: Option<super::GpuObject>,
}

impl_gfx_resource!(Texture, TextureSetup, ResourceKind::Texture, texture);

impl AsyncResource for Texture {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_byte_size_with_mips() {
        let setup = TextureSetup::from_pixel_data("checker", 4, 4, PixelFormat::RGBA8).with_mipmaps(3);
        // 4x4 + 2x2 + 1x1
        assert_eq!(setup.byte_size(), Some((16 + 4 + 1) * 4));
    }

    #[test]
    fn test_texture_byte_size_overflow() {
        let setup = TextureSetup::render_target("huge", u32::MAX, u32::MAX, PixelFormat::RGBA32F);
        assert_eq!(setup.byte_size(), None);
    }
}
