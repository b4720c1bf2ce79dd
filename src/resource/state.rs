//! 资源状态机
//!
//! ```text
//! Initial ──> Setup ──> Valid | Failed
//!    └─────> Pending ─> Valid | Failed
//! ```
//!
//! `InvalidState` 只作为查询结果返回，表示句柄已无法解析，从不写入槽位。

use std::fmt;

/// 资源状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceState {
    /// 槽位已分配，尚未填充
    #[default]
    Initial,
    /// 同步创建中
    Setup,
    /// 等待异步数据
    Pending,
    /// 创建成功
    Valid,
    /// 创建失败
    Failed,
    /// 句柄无法解析
    InvalidState,
}

impl ResourceState {
    /// 是否为终态（Valid 或 Failed）
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResourceState::Valid | ResourceState::Failed)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResourceState::Initial => "Initial",
            ResourceState::Setup => "Setup",
            ResourceState::Pending => "Pending",
            ResourceState::Valid => "Valid",
            ResourceState::Failed => "Failed",
            ResourceState::InvalidState => "InvalidState",
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
