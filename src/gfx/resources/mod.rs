//! 图形资源类型
//!
//! 每种资源由两部分组成：
//! - `*Setup`：创建参数，携带用于去重的定位符
//! - 资源本体：创建参数加上工厂创建的后端对象
//!
//! 资源本体存放在容器的资源池中，只通过容器的 API 访问。

/// 后端对象
///
/// 工厂在创建资源时附加到资源上，销毁时取走。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuObject {
    /// 后端分配的对象编号
    pub raw: u64,
    /// 占用的设备内存（字节）
    pub size: u64,
}

macro_rules! impl_gfx_resource {
    ($ty:ident, $setup:ident, $kind:expr, $field:ident) => {
        impl $crate::resource::GfxResource for $ty {
            const KIND: $crate::resource::ResourceKind = $kind;
            type Setup = $setup;

            fn from_setup(setup: $setup) -> Self {
                Self { setup, gpu: None }
            }

            fn setup(&self) -> &$setup {
                &self.setup
            }

            fn select(table: &$crate::resource::KindTable) -> &$crate::resource::KindSlot<Self> {
                &table.$field
            }

            fn select_mut(
                table: &mut $crate::resource::KindTable,
            ) -> &mut $crate::resource::KindSlot<Self> {
                &mut table.$field
            }
        }

        impl $crate::resource::ResourceSetup for $setup {
            fn locator(&self) -> &$crate::resource::Locator {
                &self.locator
            }
        }

        impl $ty {
            /// 工厂创建的后端对象
            pub fn gpu(&self) -> Option<$crate::gfx::resources::GpuObject> {
                self.gpu
            }

            /// 附加后端对象
            pub fn attach(&mut self, object: $crate::gfx::resources::GpuObject) {
                self.gpu = Some(object);
            }

            /// 取走后端对象
            pub fn detach(&mut self) -> Option<$crate::gfx::resources::GpuObject> {
                self.gpu.take()
            }
        }
    };
}

pub mod mesh;
pub mod pipeline;
pub mod render_pass;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use mesh::{IndexType, Mesh, MeshSetup, Usage};
pub use pipeline::{Pipeline, PipelineSetup, PrimitiveType};
pub use render_pass::{RenderPass, RenderPassSetup};
pub use shader::{Shader, ShaderSetup};
pub use texture::{PixelFormat, Texture, TextureSetup, TextureUsage};
pub use vertex::{Vertex, VertexAttr, VertexFormat, VertexLayout};
