//! 空后端
//!
//! 所有资源创建都立即成功，不分配任何后端对象。
//! 用于不需要图形设备的工具和测试。

mod backend;

pub use backend::{NullBackend, NullFactory};
