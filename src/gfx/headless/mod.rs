//! 无头后端
//!
//! 不连接真实的图形设备，而是用一块有预算的模拟设备内存来分配后端对象，
//! 并对每种资源的创建参数做与真实后端相同的校验。
//! 用于服务端构建、工具链和自动化测试。

mod backend;
mod memory;

pub use backend::{HeadlessBackend, HeadlessFactory};
pub use memory::DeviceMemory;
