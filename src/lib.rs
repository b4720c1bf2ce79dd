//! DistResource - 图形资源生命周期管理
//!
//! 为 DistRender 引擎管理 GPU 资源：固定容量的资源池、带代数的资源句柄、
//! 同步和异步创建的状态机、按标签的即时或延迟销毁，以及每帧推进的加载器。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（日志、配置、错误处理）
//! - `resource`: 资源生命周期管理（句柄、资源池、注册表、容器、加载器）
//! - `gfx`: 资源种类定义和图形后端
//!
//! # 使用示例
//!
//! ```no_run
//! use dist_resource::core::Config;
//! use dist_resource::gfx::{self, resources::{IndexType, Mesh, MeshSetup, Vertex}};
//! use dist_resource::resource::ResourceContainer;
//!
//! let config = Config::default();
//! let backend = gfx::create_backend(&config.graphics);
//! let mut container = ResourceContainer::new(&config.resources, backend.create_factories());
//!
//! let vertices = [Vertex::default(); 3];
//! let setup = MeshSetup::from_data("triangle", Vertex::layout(), 3, 0, IndexType::None);
//!
//! let label = {
//!     let mut scope = container.label_scope();
//!     scope.create::<Mesh>(setup, Some(bytemuck::cast_slice(&vertices)));
//!     scope.label()
//! };
//!
//! container.destroy_deferred(label);
//! container.garbage_collect();
//! ```

pub mod core;
pub mod gfx;
pub mod resource;
