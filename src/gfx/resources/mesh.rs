//! 网格资源

use super::vertex::VertexLayout;
use crate::resource::{AsyncResource, Locator, ResourceKind};

/// 索引类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexType {
    /// 无索引
    #[default]
    None,
    U16,
    U32,
}

impl IndexType {
    pub fn byte_size(&self) -> usize {
        match self {
            IndexType::None => 0,
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// 缓冲区用途
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Usage {
    /// 创建时一次性提供数据
    #[default]
    Immutable,
    /// 偶尔更新
    Dynamic,
    /// 每帧更新
    Stream,
}

/// 网格创建参数
#[derive(Debug, Clone)]
pub struct MeshSetup {
    pub locator: Locator,
    pub layout: VertexLayout,
    pub num_vertices: usize,
    pub num_indices: usize,
    pub index_type: IndexType,
    pub usage: Usage,
}

impl MeshSetup {
    /// 从内存数据创建不可变网格
    ///
    /// 初始数据依次是顶点数据和索引数据。
    pub fn from_data(
        locator: impl Into<Locator>,
        layout: VertexLayout,
        num_vertices: usize,
        num_indices: usize,
        index_type: IndexType,
    ) -> Self {
        Self {
            locator: locator.into(),
            layout,
            num_vertices,
            num_indices,
            index_type,
            usage: Usage::Immutable,
        }
    }

    /// 创建不带初始数据的动态网格
    pub fn dynamic(locator: impl Into<Locator>, layout: VertexLayout, num_vertices: usize, usage: Usage) -> Self {
        Self {
            locator: locator.into(),
            layout,
            num_vertices,
            num_indices: 0,
            index_type: IndexType::None,
            usage,
        }
    }

    /// 顶点数据字节数，溢出时返回 `None`
    pub fn vertex_data_size(&self) -> Option<usize> {
        self.num_vertices.checked_mul(self.layout.byte_size())
    }

    /// 索引数据字节数，溢出时返回 `None`
    pub fn index_data_size(&self) -> Option<usize> {
        self.num_indices.checked_mul(self.index_type.byte_size())
    }

    /// 初始数据的总字节数，溢出时返回 `None`
    pub fn data_size(&self) -> Option<usize> {
        self.vertex_data_size()?.checked_add(self.index_data_size()?)
    }
}

/// 网格资源
#[derive(Debug)]
pub struct Mesh {
    setup: MeshSetup,
    gpu: Option<super::GpuObject>,
}

impl_gfx_resource!(Mesh, MeshSetup, ResourceKind::Mesh, mesh);

impl AsyncResource for Mesh {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::Vertex;

    #[test]
    fn test_mesh_data_size() {
        let setup = MeshSetup::from_data("quad", Vertex::layout(), 4, 6, IndexType::U16);
        assert_eq!(setup.vertex_data_size(), Some(4 * 32));
        assert_eq!(setup.index_data_size(), Some(12));
        assert_eq!(setup.data_size(), Some(140));
        assert_eq!(setup.usage, Usage::Immutable);
    }

    #[test]
    fn test_mesh_data_size_overflow() {
        let setup = MeshSetup::dynamic("huge", Vertex::layout(), usize::MAX / 2, Usage::Stream);
        assert_eq!(setup.vertex_data_size(), None);
        assert_eq!(setup.data_size(), None);
        assert_eq!(setup.index_data_size(), Some(0));
    }
}
