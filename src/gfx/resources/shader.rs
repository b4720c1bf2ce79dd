//! 着色器资源

use crate::resource::{Locator, ResourceKind};

/// 着色器创建参数
///
/// 源码以文本形式提供，由后端工厂编译。
#[derive(Debug, Clone)]
pub struct ShaderSetup {
    pub locator: Locator,
    pub vertex_source: String,
    pub fragment_source: String,
    /// 入口函数名
    pub entry_point: String,
}

impl ShaderSetup {
    pub fn new(
        locator: impl Into<Locator>,
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
    ) -> Self {
        Self {
            locator: locator.into(),
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            entry_point: "main".to_string(),
        }
    }

    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }
}

/// 着色器资源
#[derive(Debug)]
pub struct Shader {
    setup: ShaderSetup,
    gpu: Option<super::GpuObject>,
}

impl_gfx_resource!(Shader, ShaderSetup, ResourceKind::Shader, shader);
