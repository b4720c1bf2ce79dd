//! 图形后端模块
//!
//! 本模块包含资源种类的定义和具体的后端实现：
//! - `resources`：网格、着色器、纹理、管线、渲染通道的创建参数和资源本体
//! - `null`：所有创建都成功的空后端
//! - `headless`：带显存预算和参数校验的无头后端
//!
//! 所有后端都实现了统一的 `GraphicsBackend` trait，通过它向资源容器提供工厂。

pub mod backend;
pub mod headless;
pub mod null;
pub mod resources;

pub use backend::{GfxFactories, GraphicsBackend};
pub use headless::HeadlessBackend;
pub use null::NullBackend;

use crate::core::config::{BackendKind, GraphicsConfig};

/// 按配置创建图形后端
pub fn create_backend(config: &GraphicsConfig) -> Box<dyn GraphicsBackend> {
    match config.backend {
        BackendKind::Null => Box::new(NullBackend::new()),
        BackendKind::Headless => Box::new(HeadlessBackend::from_config(config)),
    }
}
