//! 资源句柄
//!
//! `Id` 是对池中资源的轻量引用：资源种类、槽位索引和代数。
//! 槽位被释放时代数递增，持有旧代数的句柄随即失效，
//! 不会误指向之后分配到同一槽位的新资源。

use std::fmt;

/// 资源种类
///
/// 种类集合是封闭的，容器对种类的分发都使用穷尽的 `match`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Mesh,
    Shader,
    Texture,
    Pipeline,
    RenderPass,
}

impl ResourceKind {
    /// 全部资源种类，顺序即每帧更新资源池的固定顺序
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Mesh,
        ResourceKind::Shader,
        ResourceKind::Texture,
        ResourceKind::Pipeline,
        ResourceKind::RenderPass,
    ];

    /// 种类数量
    pub const COUNT: usize = Self::ALL.len();

    /// 获取种类名称
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Mesh => "Mesh",
            ResourceKind::Shader => "Shader",
            ResourceKind::Texture => "Texture",
            ResourceKind::Pipeline => "Pipeline",
            ResourceKind::RenderPass => "RenderPass",
        }
    }

    /// 配置文件中使用的键名前缀
    pub fn config_key(&self) -> &'static str {
        match self {
            ResourceKind::Mesh => "mesh",
            ResourceKind::Shader => "shader",
            ResourceKind::Texture => "texture",
            ResourceKind::Pipeline => "pipeline",
            ResourceKind::RenderPass => "render_pass",
        }
    }

    /// 种类在 `ALL` 中的下标
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// 是否支持 prepare / init / failed 异步创建协议
    pub fn supports_async(&self) -> bool {
        matches!(self, ResourceKind::Mesh | ResourceKind::Texture)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 资源句柄
///
/// 可以自由复制，不拥有底层资源。代数从 1 开始，代数为 0 的句柄永远无效，
/// 因此 `Id::default()` 就是无效句柄。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id {
    /// 资源种类
    pub kind: ResourceKind,
    /// 池中的槽位索引
    pub slot: u16,
    /// 槽位代数
    pub generation: u32,
}

impl Id {
    /// 无效句柄的代数
    pub const INVALID_GENERATION: u32 = 0;

    /// 创建句柄
    pub fn new(kind: ResourceKind, slot: u16, generation: u32) -> Self {
        Self { kind, slot, generation }
    }

    /// 无效句柄
    pub fn invalid() -> Self {
        Self {
            kind: ResourceKind::Mesh,
            slot: 0,
            generation: Self::INVALID_GENERATION,
        }
    }

    /// 句柄是否可能有效
    ///
    /// 只检查代数。是否仍指向存活的资源需要询问所属的资源池。
    pub fn is_valid(&self) -> bool {
        self.generation != Self::INVALID_GENERATION
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::invalid()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}#{}.{}", self.kind, self.slot, self.generation)
        } else {
            f.write_str("InvalidId")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_id_is_invalid() {
        assert!(!Id::default().is_valid());
        assert_eq!(Id::default(), Id::invalid());
        assert!(Id::new(ResourceKind::Texture, 0, 1).is_valid());
    }

    #[test]
    fn test_id_equality_is_structural() {
        let a = Id::new(ResourceKind::Mesh, 3, 1);
        assert_eq!(a, Id::new(ResourceKind::Mesh, 3, 1));
        assert_ne!(a, Id::new(ResourceKind::Mesh, 3, 2));
        assert_ne!(a, Id::new(ResourceKind::Shader, 3, 1));
    }

    #[test]
    fn test_kind_order_and_index() {
        for (i, kind) in ResourceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert!(ResourceKind::Texture.supports_async());
        assert!(!ResourceKind::Pipeline.supports_async());
        assert_eq!(Id::new(ResourceKind::Mesh, 3, 1).to_string(), "Mesh#3.1");
    }
}
