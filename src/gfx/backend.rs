//! 图形后端的统一抽象接口
//!
//! 后端只负责一件事：为每种资源提供一个工厂。
//! 资源容器在创建时接收这组工厂，之后所有后端对象的创建和释放都经由工厂完成，
//! 容器本身不依赖任何具体的图形 API。

use super::resources::{Mesh, Pipeline, RenderPass, Shader, Texture};
use crate::resource::ResourceFactory;

/// 每种资源的工厂
///
/// 作为注入策略交给 `ResourceContainer::new`。
pub struct GfxFactories {
    pub mesh: Box<dyn ResourceFactory<Mesh>>,
    pub shader: Box<dyn ResourceFactory<Shader>>,
    pub texture: Box<dyn ResourceFactory<Texture>>,
    pub pipeline: Box<dyn ResourceFactory<Pipeline>>,
    pub render_pass: Box<dyn ResourceFactory<RenderPass>>,
}

/// 图形后端的统一接口
///
/// # 设计原则
///
/// - 后端持有设备级状态，工厂共享这份状态
/// - 同一个后端可以为多个容器创建工厂
pub trait GraphicsBackend {
    /// 获取后端的名称
    ///
    /// 用于日志输出和调试。
    fn backend_name(&self) -> &str;

    /// 为每种资源创建工厂
    fn create_factories(&self) -> GfxFactories;

    /// 当前占用的设备内存（字节），不跟踪内存的后端返回 `None`
    fn memory_in_use(&self) -> Option<u64> {
        None
    }
}
