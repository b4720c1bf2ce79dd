/// 顶点布局定义模块
///
/// 描述网格和管线使用的顶点格式，并提供一个与 GPU 兼容的标准顶点结构。

use bytemuck::{Pod, Zeroable};

/// 顶点属性语义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttr {
    Position,
    Normal,
    TexCoord0,
    Tangent,
    Color0,
}

/// 顶点分量格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float2,
    Float3,
    Float4,
    /// 4 个归一化的无符号字节
    UByte4N,
}

impl VertexFormat {
    /// 分量占用的字节数
    pub fn byte_size(&self) -> usize {
        match self {
            VertexFormat::Float2 => 8,
            VertexFormat::Float3 => 12,
            VertexFormat::Float4 => 16,
            VertexFormat::UByte4N => 4,
        }
    }
}

/// 顶点分量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexComponent {
    pub attr: VertexAttr,
    pub format: VertexFormat,
}

/// 顶点布局
///
/// 分量按声明顺序紧密排列。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    components: Vec<VertexComponent>,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个分量
    pub fn add(mut self, attr: VertexAttr, format: VertexFormat) -> Self {
        self.components.push(VertexComponent { attr, format });
        self
    }

    pub fn components(&self) -> &[VertexComponent] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// 单个顶点的字节跨度
    pub fn byte_size(&self) -> usize {
        self.components.iter().map(|c| c.format.byte_size()).sum()
    }

    /// 某个属性在顶点内的字节偏移
    pub fn offset_of(&self, attr: VertexAttr) -> Option<usize> {
        let mut offset = 0;
        for component in &self.components {
            if component.attr == attr {
                return Some(offset);
            }
            offset += component.format.byte_size();
        }
        None
    }
}

/// 标准3D顶点结构
///
/// 内存布局与 `Vertex::layout()` 一致，可以直接用 `bytemuck::cast_slice`
/// 转换为网格的初始数据。
///
/// # 内存布局
///
/// - position: 12 bytes (3 * f32)
/// - normal: 12 bytes (3 * f32)
/// - texcoord: 8 bytes (2 * f32)
/// - **总计**: 32 bytes
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    /// 顶点位置 (x, y, z)
    pub position: [f32; 3],

    /// 法线向量 (nx, ny, nz)
    pub normal: [f32; 3],

    /// 纹理坐标 (u, v)
    pub texcoord: [f32; 2],
}

impl Vertex {
    #[inline]
    pub fn new(position: [f32; 3], normal: [f32; 3], texcoord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            texcoord,
        }
    }

    /// 与该结构对应的顶点布局
    pub fn layout() -> VertexLayout {
        VertexLayout::new()
            .add(VertexAttr::Position, VertexFormat::Float3)
            .add(VertexAttr::Normal, VertexFormat::Float3)
            .add(VertexAttr::TexCoord0, VertexFormat::Float2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_vertex_matches_layout() {
        assert_eq!(size_of::<Vertex>(), 32);
        assert_eq!(Vertex::layout().byte_size(), size_of::<Vertex>());
    }

    #[test]
    fn test_layout_offsets() {
        let layout = Vertex::layout();
        assert_eq!(layout.offset_of(VertexAttr::Position), Some(0));
        assert_eq!(layout.offset_of(VertexAttr::Normal), Some(12));
        assert_eq!(layout.offset_of(VertexAttr::TexCoord0), Some(24));
        assert_eq!(layout.offset_of(VertexAttr::Color0), None);
    }
}
