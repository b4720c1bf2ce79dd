//! 资源标签与标签栈
//!
//! 创建资源时，容器把当前标签栈的路径记录到注册表条目上。
//! 之后按标签销毁即可释放该标签作用域内（含嵌套作用域）创建的全部资源。

use std::fmt;

/// 资源标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLabel(pub u32);

impl ResourceLabel {
    /// 位于标签栈底部的默认标签
    pub const DEFAULT: ResourceLabel = ResourceLabel(0);
    /// 匹配所有资源的标签，只用于销毁
    pub const ALL: ResourceLabel = ResourceLabel(u32::MAX);

    pub fn is_all(&self) -> bool {
        *self == Self::ALL
    }
}

impl fmt::Display for ResourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::DEFAULT => f.write_str("Label(Default)"),
            Self::ALL => f.write_str("Label(All)"),
            ResourceLabel(value) => write!(f, "Label({})", value),
        }
    }
}

/// 固定容量的标签栈
///
/// 栈底始终是 `ResourceLabel::DEFAULT`，不能被弹出。
#[derive(Debug)]
pub struct LabelStack {
    stack: Vec<ResourceLabel>,
    capacity: usize,
    next_label: u32,
}

impl LabelStack {
    /// 创建标签栈
    ///
    /// # 参数
    ///
    /// * `capacity` - 最大深度，包含栈底的默认标签
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Label stack capacity must be greater than 0");
        let mut stack = Vec::with_capacity(capacity);
        stack.push(ResourceLabel::DEFAULT);
        Self {
            stack,
            capacity,
            next_label: 1,
        }
    }

    /// 生成一个新的唯一标签并压栈
    pub fn push_new(&mut self) -> ResourceLabel {
        let label = self.generate();
        self.push(label);
        label
    }

    /// 压入指定标签
    ///
    /// 超出容量或压入 `ALL` 都是用法错误。
    pub fn push(&mut self, label: ResourceLabel) {
        assert!(!label.is_all(), "ResourceLabel::ALL cannot be pushed onto the label stack");
        assert!(
            self.stack.len() < self.capacity,
            "Label stack overflow (capacity {})",
            self.capacity
        );
        self.stack.push(label);
    }

    /// 弹出栈顶标签
    ///
    /// 弹出栈底的默认标签是用法错误。
    pub fn pop(&mut self) -> ResourceLabel {
        assert!(self.stack.len() > 1, "Label stack underflow: unbalanced pop_label");
        self.stack.pop().unwrap_or(ResourceLabel::DEFAULT)
    }

    /// 栈顶标签
    pub fn peek(&self) -> ResourceLabel {
        self.stack.last().copied().unwrap_or(ResourceLabel::DEFAULT)
    }

    /// 已压入的标签数（不含栈底）
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 新资源要记录的标签路径
    ///
    /// 有标签压栈时不包含栈底的默认标签，否则只有默认标签。
    pub fn path(&self) -> Vec<ResourceLabel> {
        if self.stack.len() > 1 {
            self.stack[1..].to_vec()
        } else {
            vec![ResourceLabel::DEFAULT]
        }
    }

    /// 生成的标签不会回绕复用，标签空间耗尽是致命错误
    fn generate(&mut self) -> ResourceLabel {
        assert!(
            self.next_label < ResourceLabel::ALL.0,
            "Resource label space exhausted"
        );
        let label = ResourceLabel(self.next_label);
        self.next_label += 1;
        label
    }
}
