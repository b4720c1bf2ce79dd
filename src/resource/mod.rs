//! 资源生命周期管理
//!
//! 为每种图形资源提供固定容量的资源池和可复用的代数句柄，
//! 跟踪每个资源在同步或异步创建流程中的状态，并支持按标签的即时销毁、
//! 延迟销毁和垃圾回收。
//!
//! # 模块组织
//!
//! - `id`：资源句柄和资源种类
//! - `state`：资源状态机
//! - `locator`：用于去重的资源定位符
//! - `label`：资源标签和标签栈
//! - `pool`：固定容量的资源池
//! - `registry`：定位符和标签到句柄的映射
//! - `factory`：资源工厂契约
//! - `loader`：异步加载器
//! - `container`：顶层资源容器
//! - `info`：诊断快照

pub mod container;
pub mod factory;
pub mod id;
pub mod info;
pub mod label;
pub mod loader;
pub mod locator;
pub mod pool;
pub mod registry;
pub mod state;

pub use container::{KindSlot, KindTable, LabelScope, ResourceContainer};
pub use factory::{AsyncResource, GfxResource, ResourceFactory, ResourceSetup};
pub use id::{Id, ResourceKind};
pub use info::{ResourceInfo, ResourcePoolInfo};
pub use label::{LabelStack, ResourceLabel};
pub use loader::{ChannelLoader, LoadSender, ResourceLoader, ThreadedLoader};
pub use locator::Locator;
pub use pool::ResourcePool;
pub use registry::ResourceRegistry;
pub use state::ResourceState;
