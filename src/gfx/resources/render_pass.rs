//! 渲染通道资源

use crate::resource::{Id, Locator, ResourceKind};

/// 渲染通道创建参数
#[derive(Debug, Clone)]
pub struct RenderPassSetup {
    pub locator: Locator,
    /// 颜色附件（渲染目标纹理）
    pub color_attachments: Vec<Id>,
    /// 深度附件
    pub depth_attachment: Option<Id>,
}

impl RenderPassSetup {
    pub fn new(locator: impl Into<Locator>, color_attachments: Vec<Id>) -> Self {
        Self {
            locator: locator.into(),
            color_attachments,
            depth_attachment: None,
        }
    }

    pub fn with_depth(mut self, depth: Id) -> Self {
        self.depth_attachment = Some(depth);
        self
    }
}

/// 渲染通道资源
#[derive(Debug)]
pub struct RenderPass {
    setup: RenderPassSetup,
    gpu: Option<super::GpuObject>,
}

impl_gfx_resource!(RenderPass, RenderPassSetup, ResourceKind::RenderPass, render_pass);
