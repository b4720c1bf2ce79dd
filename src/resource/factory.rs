//! 资源工厂契约
//!
//! 工厂是后端相关的转换器：把资源的创建参数和数据变成后端对象，
//! 或者释放后端对象。容器通过 trait 对象持有每种资源的工厂，
//! 具体后端在创建容器时注入。

use std::fmt::Debug;

use super::container::{KindSlot, KindTable};
use super::id::ResourceKind;
use super::locator::Locator;
use super::state::ResourceState;

/// 资源创建参数
pub trait ResourceSetup: Clone + Debug {
    /// 用于去重的定位符
    fn locator(&self) -> &Locator;
}

/// 可由容器管理的资源类型
///
/// 每种资源对应一个 `ResourceKind`，容器通过 `select` 找到该种类的资源池和工厂，
/// 类型化的 API（`create::<Mesh>` 等）由此静态分发。
pub trait GfxResource: Debug + Sized + 'static {
    /// 资源种类
    const KIND: ResourceKind;

    /// 创建参数类型
    type Setup: ResourceSetup;

    /// 用创建参数构造尚未创建后端对象的资源
    fn from_setup(setup: Self::Setup) -> Self;

    /// 构造时使用的创建参数
    fn setup(&self) -> &Self::Setup;

    #[doc(hidden)]
    fn select(table: &KindTable) -> &KindSlot<Self>;

    #[doc(hidden)]
    fn select_mut(table: &mut KindTable) -> &mut KindSlot<Self>;
}

/// 支持 prepare / init / failed 异步创建协议的资源
pub trait AsyncResource: GfxResource {}

/// 资源工厂
///
/// # 契约
///
/// - `setup_resource` 只能返回 `Valid` 或 `Failed`
/// - `destroy_resource` 只会在 `Valid` 的资源上调用
/// - 工厂不能在调用结束后持有资源数据，也不能无限期阻塞调用线程
pub trait ResourceFactory<R: GfxResource> {
    /// 创建后端对象
    ///
    /// # 参数
    ///
    /// * `resource` - 已用创建参数构造好的资源
    /// * `data` - 可选的初始数据（顶点、像素等）
    fn setup_resource(&mut self, resource: &mut R, data: Option<&[u8]>) -> ResourceState;

    /// 释放后端对象
    fn destroy_resource(&mut self, resource: &mut R);

    /// 每帧调用一次，紧跟在该种类资源池的更新之后
    fn update(&mut self) {}

    /// 容器销毁时调用
    fn discard(&mut self) {}
}
