//! 管线资源

use super::vertex::VertexLayout;
use crate::resource::{Id, Locator, ResourceKind};

/// 图元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveType {
    Points,
    Lines,
    #[default]
    Triangles,
    TriangleStrip,
}

/// 管线创建参数
#[derive(Debug, Clone)]
pub struct PipelineSetup {
    pub locator: Locator,
    /// 管线使用的着色器
    pub shader: Id,
    pub layout: VertexLayout,
    pub primitive: PrimitiveType,
}

impl PipelineSetup {
    pub fn new(locator: impl Into<Locator>, shader: Id, layout: VertexLayout) -> Self {
        Self {
            locator: locator.into(),
            shader,
            layout,
            primitive: PrimitiveType::default(),
        }
    }
}

/// 管线资源
#[derive(Debug)]
pub struct Pipeline {
    setup: PipelineSetup,
    gpu: Option<super::GpuObject>,
}

impl_gfx_resource!(Pipeline, PipelineSetup, ResourceKind::Pipeline, pipeline);
