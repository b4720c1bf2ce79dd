//! 诊断信息
//!
//! 只读快照，供工具和遥测使用。

use super::id::{Id, ResourceKind};
use super::label::ResourceLabel;
use super::locator::Locator;
use super::state::ResourceState;

/// 单个资源的状态快照
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceInfo {
    pub id: Id,
    pub kind: ResourceKind,
    pub state: ResourceState,
    /// 创建时使用的定位符（槽位未填充时为非共享定位符）
    pub locator: Locator,
    /// 创建时的栈顶标签，资源已从注册表移除时为 `None`
    pub label: Option<ResourceLabel>,
}

impl ResourceInfo {
    /// 句柄无法解析时的快照
    pub fn invalid(id: Id) -> Self {
        Self {
            id,
            kind: id.kind,
            state: ResourceState::InvalidState,
            locator: Locator::non_shared(),
            label: None,
        }
    }
}

/// 资源池占用统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePoolInfo {
    pub kind: ResourceKind,
    pub num_slots: usize,
    pub num_used_slots: usize,
    pub num_free_slots: usize,
    pub num_pending: usize,
    pub num_valid: usize,
    pub num_failed: usize,
}
