//! 资源容器
//!
//! 资源系统的顶层入口：每种资源一对资源池和工厂，加上注册表、标签栈、
//! 待推进的加载器和延迟销毁队列。所有修改都通过容器的 API 进行。
//!
//! # 创建流程
//!
//! ```text
//! create(setup, data)
//!   -> 注册表按定位符去重
//!   -> 资源池分配槽位
//!   -> 注册表记录（定位符, 句柄, 标签路径）
//!   -> 工厂同步创建，返回 Valid / Failed
//!   -> 写入资源池状态
//! ```
//!
//! # 销毁
//!
//! - `destroy(label)`：立即从注册表移除并释放后端对象和槽位
//! - `destroy_deferred(label)`：立即从注册表移除，后端对象和槽位留到
//!   `garbage_collect()` 时按入队顺序释放
//!
//! # 线程模型
//!
//! 容器只在拥有它的线程上使用。加载器负责把后台线程的结果带回这个线程，
//! 在 `update()` 中通过 `init_async` / `failed_async` 交付。

use std::ops::{Deref, DerefMut};

use super::factory::{AsyncResource, GfxResource, ResourceFactory, ResourceSetup};
use super::id::{Id, ResourceKind};
use super::info::{ResourceInfo, ResourcePoolInfo};
use super::label::{LabelStack, ResourceLabel};
use super::loader::ResourceLoader;
use super::locator::Locator;
use super::pool::ResourcePool;
use super::registry::ResourceRegistry;
use super::state::ResourceState;
use crate::core::config::ResourceConfig;
use crate::gfx::backend::GfxFactories;
use crate::gfx::resources::{Mesh, Pipeline, RenderPass, Shader, Texture};
use crate::{resource_debug, resource_info, resource_warn, span_trace};

/// 按资源种类分发到对应类型的泛型函数
macro_rules! dispatch_kind {
    ($kind:expr, $func:ident($($arg:expr),*)) => {
        match $kind {
            ResourceKind::Mesh => $func::<Mesh>($($arg),*),
            ResourceKind::Shader => $func::<Shader>($($arg),*),
            ResourceKind::Texture => $func::<Texture>($($arg),*),
            ResourceKind::Pipeline => $func::<Pipeline>($($arg),*),
            ResourceKind::RenderPass => $func::<RenderPass>($($arg),*),
        }
    };
}

/// 单个种类的资源池和工厂
pub struct KindSlot<R: GfxResource> {
    pub(crate) pool: ResourcePool<R>,
    pub(crate) factory: Box<dyn ResourceFactory<R>>,
}

impl<R: GfxResource> KindSlot<R> {
    fn new(capacity: usize, factory: Box<dyn ResourceFactory<R>>) -> Self {
        Self {
            pool: ResourcePool::new(capacity),
            factory,
        }
    }
}

/// 全部种类的资源池和工厂
pub struct KindTable {
    pub(crate) mesh: KindSlot<Mesh>,
    pub(crate) shader: KindSlot<Shader>,
    pub(crate) texture: KindSlot<Texture>,
    pub(crate) pipeline: KindSlot<Pipeline>,
    pub(crate) render_pass: KindSlot<RenderPass>,
}

// 以下泛型函数供 dispatch_kind! 使用

fn update_kind<R: GfxResource>(table: &mut KindTable) {
    let slot = R::select_mut(table);
    slot.pool.update();
    slot.factory.update();
}

fn discard_kind<R: GfxResource>(table: &mut KindTable) {
    R::select_mut(table).factory.discard();
}

fn destroy_kind<R: GfxResource>(table: &mut KindTable, id: Id) {
    let slot = R::select_mut(table);
    if slot.pool.query_state(id) == ResourceState::Valid {
        if let Some(resource) = slot.pool.lookup_mut(id) {
            slot.factory.destroy_resource(resource);
        }
    }
    slot.pool.unassign(id);
}

fn failed_kind<R: AsyncResource>(table: &mut KindTable, id: Id) -> ResourceState {
    let pool = &mut R::select_mut(table).pool;
    if !pool.contains(id) {
        resource_warn!(id = %id, "failed_async: resource no longer exists");
        return ResourceState::InvalidState;
    }
    pool.update_state(id, ResourceState::Failed);
    ResourceState::Failed
}

fn query_state_kind<R: GfxResource>(table: &KindTable, id: Id) -> ResourceState {
    R::select(table).pool.query_state(id)
}

fn resource_info_kind<R: GfxResource>(table: &KindTable, id: Id) -> ResourceInfo {
    R::select(table).pool.query_resource_info(id)
}

fn pool_info_kind<R: GfxResource>(table: &KindTable) -> ResourcePoolInfo {
    R::select(table).pool.query_pool_info()
}

fn free_slots_kind<R: GfxResource>(table: &KindTable) -> usize {
    R::select(table).pool.num_free_slots()
}

/// 资源容器
pub struct ResourceContainer {
    table: KindTable,
    registry: ResourceRegistry,
    labels: LabelStack,
    pending_loaders: Vec<Box<dyn ResourceLoader>>,
    destroy_queue: Vec<Id>,
    valid: bool,
}

impl ResourceContainer {
    /// 创建资源容器
    ///
    /// # 参数
    ///
    /// * `config` - 资源池、标签栈和注册表的固定容量
    /// * `factories` - 后端提供的每种资源的工厂
    pub fn new(config: &ResourceConfig, factories: GfxFactories) -> Self {
        let GfxFactories {
            mesh,
            shader,
            texture,
            pipeline,
            render_pass,
        } = factories;

        let table = KindTable {
            mesh: KindSlot::new(config.pool_size(ResourceKind::Mesh), mesh),
            shader: KindSlot::new(config.pool_size(ResourceKind::Shader), shader),
            texture: KindSlot::new(config.pool_size(ResourceKind::Texture), texture),
            pipeline: KindSlot::new(config.pool_size(ResourceKind::Pipeline), pipeline),
            render_pass: KindSlot::new(config.pool_size(ResourceKind::RenderPass), render_pass),
        };

        resource_info!(
            mesh = config.mesh_pool_size,
            shader = config.shader_pool_size,
            texture = config.texture_pool_size,
            pipeline = config.pipeline_pool_size,
            render_pass = config.render_pass_pool_size,
            registry = config.registry_capacity,
            "Resource container created"
        );

        Self {
            table,
            registry: ResourceRegistry::new(config.registry_capacity),
            labels: LabelStack::new(config.label_stack_capacity),
            pending_loaders: Vec::new(),
            destroy_queue: Vec::new(),
            valid: true,
        }
    }

    /// 容器是否仍可使用（`discard` 之前）
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    // ---------------------------------------------------------------
    // 标签
    // ---------------------------------------------------------------

    /// 生成一个新标签并压栈
    pub fn push_label(&mut self) -> ResourceLabel {
        self.assert_valid();
        self.labels.push_new()
    }

    /// 压入已有标签
    pub fn push_label_with(&mut self, label: ResourceLabel) {
        self.assert_valid();
        self.labels.push(label);
    }

    /// 弹出栈顶标签
    pub fn pop_label(&mut self) -> ResourceLabel {
        self.assert_valid();
        self.labels.pop()
    }

    pub fn peek_label(&self) -> ResourceLabel {
        self.labels.peek()
    }

    /// 压入新标签并返回作用域守卫，守卫释放时自动弹出
    ///
    /// # 示例
    ///
    /// ```ignore
    /// let label = {
    ///     let mut scope = container.label_scope();
    ///     scope.create::<Mesh>(setup, Some(&data));
    ///     scope.label()
    /// };
    /// container.destroy(label);
    /// ```
    pub fn label_scope(&mut self) -> LabelScope<'_> {
        let label = self.push_label();
        LabelScope {
            container: self,
            label,
        }
    }

    // ---------------------------------------------------------------
    // 创建
    // ---------------------------------------------------------------

    /// 同步创建资源
    ///
    /// 共享定位符已注册时直接返回已有句柄，不会再次调用工厂。
    /// 工厂创建失败时资源处于 `Failed` 状态，仍需显式销毁。
    ///
    /// # 参数
    ///
    /// * `setup` - 创建参数
    /// * `data` - 可选的初始数据
    pub fn create<R: GfxResource>(&mut self, setup: R::Setup, data: Option<&[u8]>) -> Id {
        self.assert_valid();

        let existing = self.lookup_existing::<R>(setup.locator());
        if existing.is_valid() {
            return existing;
        }

        let locator = setup.locator().clone();
        let slot = R::select_mut(&mut self.table);
        let id = slot.pool.alloc_id();
        self.registry.add(locator.clone(), id, self.labels.path());

        let resource = slot.pool.assign(id, setup, ResourceState::Setup);
        let state = slot.factory.setup_resource(resource, data);
        assert!(
            state.is_terminal(),
            "{} factory returned {} from setup_resource",
            R::KIND,
            state
        );
        slot.pool.update_state(id, state);

        if state == ResourceState::Failed {
            resource_warn!(id = %id, locator = %locator, "Resource creation failed");
        } else {
            resource_debug!(id = %id, locator = %locator, "Resource created");
        }
        id
    }

    /// 预留异步创建的槽位
    ///
    /// 立即注册定位符并返回 `Pending` 状态的句柄，数据到达后调用 `init_async`。
    /// 共享定位符已注册时是致命错误，需要按定位符去重时使用 `load`。
    pub fn prepare_async<R: AsyncResource>(&mut self, setup: R::Setup) -> Id {
        self.assert_valid();

        let existing = self.lookup_existing::<R>(setup.locator());
        assert!(
            !existing.is_valid(),
            "prepare_async: locator '{}' is already registered as {}",
            setup.locator(),
            existing
        );

        let locator = setup.locator().clone();
        let slot = R::select_mut(&mut self.table);
        let id = slot.pool.alloc_id();
        self.registry.add(locator, id, self.labels.path());
        slot.pool.assign(id, setup, ResourceState::Pending);
        id
    }

    /// 异步数据到达后完成创建
    ///
    /// 资源在加载期间已被销毁时记录警告并返回 `InvalidState`，不修改任何资源池。
    pub fn init_async<R: AsyncResource>(&mut self, id: Id, setup: R::Setup, data: &[u8]) -> ResourceState {
        self.assert_valid();

        let slot = R::select_mut(&mut self.table);
        if !slot.pool.contains(id) {
            resource_warn!(id = %id, "init_async: resource no longer exists");
            return ResourceState::InvalidState;
        }
        let current = slot.pool.query_state(id);
        assert!(
            current == ResourceState::Pending,
            "init_async called on {} in state {}",
            id,
            current
        );

        let resource = slot.pool.assign(id, setup, ResourceState::Pending);
        let state = slot.factory.setup_resource(resource, Some(data));
        assert!(
            state.is_terminal(),
            "{} factory returned {} from setup_resource",
            R::KIND,
            state
        );
        slot.pool.update_state(id, state);
        resource_debug!(id = %id, state = %state, "Asynchronous resource initialized");
        state
    }

    /// 异步加载失败
    ///
    /// 只有网格和纹理支持异步创建，其他种类是致命的用法错误。
    pub fn failed_async(&mut self, id: Id) -> ResourceState {
        self.assert_valid();
        match id.kind {
            ResourceKind::Mesh => failed_kind::<Mesh>(&mut self.table, id),
            ResourceKind::Texture => failed_kind::<Texture>(&mut self.table, id),
            kind @ (ResourceKind::Shader | ResourceKind::Pipeline | ResourceKind::RenderPass) => {
                panic!("Invalid resource type for async creation: {}", kind)
            }
        }
    }

    /// 通过加载器异步加载资源
    ///
    /// 定位符已注册时直接返回已有句柄，不会启动加载器。
    pub fn load(&mut self, mut loader: Box<dyn ResourceLoader>) -> Id {
        self.assert_valid();

        let existing = self.registry.lookup(loader.locator());
        if existing.is_valid() {
            resource_debug!(locator = %loader.locator(), "Load request resolved from registry");
            return existing;
        }

        let id = loader.start(self);
        self.pending_loaders.push(loader);
        id
    }

    /// 按定位符查找句柄
    pub fn lookup(&self, locator: &Locator) -> Id {
        self.registry.lookup(locator)
    }

    // ---------------------------------------------------------------
    // 销毁
    // ---------------------------------------------------------------

    /// 立即销毁标签下的全部资源
    pub fn destroy(&mut self, label: ResourceLabel) {
        self.assert_valid();
        let ids = self.registry.remove(label);
        resource_debug!(label = %label, count = ids.len(), "Destroying resources");
        for id in ids {
            self.destroy_resource(id);
        }
    }

    /// 从注册表移除标签下的资源，释放推迟到 `garbage_collect`
    pub fn destroy_deferred(&mut self, label: ResourceLabel) {
        self.assert_valid();
        let ids = self.registry.remove(label);
        resource_debug!(label = %label, count = ids.len(), "Queueing resources for garbage collection");
        self.destroy_queue.extend(ids);
    }

    /// 按入队顺序释放延迟销毁队列中的资源并清空队列
    pub fn garbage_collect(&mut self) {
        self.assert_valid();
        if self.destroy_queue.is_empty() {
            return;
        }
        let _span = span_trace!("garbage_collect").entered();
        let queue = std::mem::take(&mut self.destroy_queue);
        resource_debug!(count = queue.len(), "Garbage collecting resources");
        for id in queue {
            self.destroy_resource(id);
        }
    }

    // ---------------------------------------------------------------
    // 每帧更新
    // ---------------------------------------------------------------

    /// 每帧调用一次
    ///
    /// 先按固定种类顺序执行资源池和工厂的维护，再按加入顺序推进每个加载器一步。
    /// 离开 `Pending` 的加载器被移除，其余保持原有顺序。
    pub fn update(&mut self) {
        self.assert_valid();
        let _span = span_trace!("resource_update").entered();

        for kind in ResourceKind::ALL {
            dispatch_kind!(kind, update_kind(&mut self.table));
        }

        // 推进期间新加入的加载器排在现有加载器之后
        let mut loaders = std::mem::take(&mut self.pending_loaders);
        loaders.retain_mut(|loader| !self.valid || loader.continue_loading(self) == ResourceState::Pending);

        // 加载器在推进期间销毁了容器
        if !self.valid {
            for loader in &mut loaders {
                loader.cancel();
            }
            resource_debug!(cancelled_loaders = loaders.len(), "Container discarded during update");
            return;
        }

        loaders.append(&mut self.pending_loaders);
        self.pending_loaders = loaders;
    }

    // ---------------------------------------------------------------
    // 查询
    // ---------------------------------------------------------------

    /// 查询资源状态，句柄无法解析时返回 `InvalidState`
    pub fn query_state(&self, id: Id) -> ResourceState {
        dispatch_kind!(id.kind, query_state_kind(&self.table, id))
    }

    pub fn contains(&self, id: Id) -> bool {
        self.query_state(id) != ResourceState::InvalidState
    }

    /// 获取资源本体
    pub fn get<R: GfxResource>(&self, id: Id) -> Option<&R> {
        R::select(&self.table).pool.lookup(id)
    }

    /// 单个资源的状态快照
    pub fn query_resource_info(&self, id: Id) -> ResourceInfo {
        let mut info = dispatch_kind!(id.kind, resource_info_kind(&self.table, id));
        info.label = self.registry.label_of(id);
        info
    }

    /// 某种资源池的占用统计
    pub fn query_pool_info(&self, kind: ResourceKind) -> ResourcePoolInfo {
        dispatch_kind!(kind, pool_info_kind(&self.table))
    }

    /// 某种资源池的空闲槽位数
    pub fn query_free_slots(&self, kind: ResourceKind) -> usize {
        dispatch_kind!(kind, free_slots_kind(&self.table))
    }

    pub fn num_pending_loaders(&self) -> usize {
        self.pending_loaders.len()
    }

    pub fn num_queued_destroys(&self) -> usize {
        self.destroy_queue.len()
    }

    pub fn num_registered(&self) -> usize {
        self.registry.len()
    }

    // ---------------------------------------------------------------
    // 销毁容器
    // ---------------------------------------------------------------

    /// 销毁容器
    ///
    /// 取消所有未完成的加载器，执行垃圾回收，销毁全部资源，最后通知各工厂。
    /// 之后容器不可再使用。重复调用无效果。
    pub fn discard(&mut self) {
        if !self.valid {
            return;
        }

        for loader in &mut self.pending_loaders {
            loader.cancel();
        }
        let cancelled = self.pending_loaders.len();
        self.pending_loaders.clear();

        self.garbage_collect();
        self.destroy(ResourceLabel::ALL);

        for kind in ResourceKind::ALL {
            dispatch_kind!(kind, discard_kind(&mut self.table));
        }
        self.valid = false;

        resource_info!(cancelled_loaders = cancelled, "Resource container discarded");
    }

    fn lookup_existing<R: GfxResource>(&self, locator: &Locator) -> Id {
        let existing = self.registry.lookup(locator);
        if existing.is_valid() {
            assert!(
                existing.kind == R::KIND,
                "Locator '{}' is registered as {}, requested as {}",
                locator,
                existing.kind,
                R::KIND
            );
        }
        existing
    }

    fn destroy_resource(&mut self, id: Id) {
        dispatch_kind!(id.kind, destroy_kind(&mut self.table, id));
    }

    fn assert_valid(&self) {
        assert!(self.valid, "ResourceContainer used after discard");
    }
}

impl Drop for ResourceContainer {
    fn drop(&mut self) {
        self.discard();
    }
}

/// 标签作用域守卫
///
/// 由 `ResourceContainer::label_scope` 创建，可以像容器一样使用，
/// 离开作用域时弹出自己的标签（包括提前返回和 panic 展开的路径）。
pub struct LabelScope<'a> {
    container: &'a mut ResourceContainer,
    label: ResourceLabel,
}

impl LabelScope<'_> {
    /// 该作用域的标签
    pub fn label(&self) -> ResourceLabel {
        self.label
    }
}

impl Deref for LabelScope<'_> {
    type Target = ResourceContainer;

    fn deref(&self) -> &ResourceContainer {
        self.container
    }
}

impl DerefMut for LabelScope<'_> {
    fn deref_mut(&mut self) -> &mut ResourceContainer {
        self.container
    }
}

impl Drop for LabelScope<'_> {
    fn drop(&mut self) {
        if !self.container.valid || self.container.labels.depth() == 0 {
            resource_warn!(label = %self.label, "Label scope closed with no label left to pop");
            return;
        }
        let popped = self.container.labels.pop();
        if popped != self.label {
            resource_warn!(expected = %self.label, popped = %popped, "Label scope closed out of order");
        }
    }
}
