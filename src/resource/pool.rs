//! 资源池
//!
//! 每种资源一个固定容量的资源池。所有槽位在创建时一次性分配，运行期间不扩容。
//!
//! # 槽位生命周期
//!
//! 1. `alloc_id`：从空闲列表取出槽位，状态为 `Initial`
//! 2. `assign`：用创建参数构造资源并设置状态（`Setup` 或 `Pending`）
//! 3. `update_state`：工厂完成后写入终态
//! 4. `unassign`：释放资源、代数加一、槽位回到空闲列表
//!
//! 所有操作都通过槽位索引直接定位，时间复杂度为 O(1)。

use std::collections::VecDeque;

use super::factory::{GfxResource, ResourceSetup};
use super::id::Id;
use super::info::{ResourceInfo, ResourcePoolInfo};
use super::locator::Locator;
use super::state::ResourceState;

/// 单个槽位
#[derive(Debug)]
struct Slot<R> {
    generation: u32,
    occupied: bool,
    state: ResourceState,
    resource: Option<R>,
}

impl<R> Slot<R> {
    fn new() -> Self {
        Self {
            generation: 1,
            occupied: false,
            state: ResourceState::Initial,
            resource: None,
        }
    }
}

/// 固定容量的资源池
#[derive(Debug)]
pub struct ResourcePool<R: GfxResource> {
    slots: Vec<Slot<R>>,
    free_slots: VecDeque<u16>,
}

impl<R: GfxResource> ResourcePool<R> {
    /// 单个资源池的最大槽位数（受 `Id::slot` 位宽限制）
    pub const MAX_SLOTS: usize = u16::MAX as usize + 1;

    /// 创建资源池
    ///
    /// # 参数
    ///
    /// * `capacity` - 槽位数，范围 `1..=65536`
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity > 0 && capacity <= Self::MAX_SLOTS,
            "{} pool capacity {} is out of range",
            R::KIND,
            capacity
        );
        Self {
            slots: (0..capacity).map(|_| Slot::new()).collect(),
            free_slots: (0..capacity).map(|i| i as u16).collect(),
        }
    }

    /// 分配一个空闲槽位
    ///
    /// 资源池耗尽是容量配置错误，直接 panic。
    pub fn alloc_id(&mut self) -> Id {
        let Some(index) = self.free_slots.pop_front() else {
            panic!(
                "{} pool exhausted: all {} slots are in use",
                R::KIND,
                self.slots.len()
            );
        };
        let slot = &mut self.slots[index as usize];
        debug_assert!(!slot.occupied);
        slot.occupied = true;
        slot.state = ResourceState::Initial;
        slot.resource = None;
        Id::new(R::KIND, index, slot.generation)
    }

    /// 为已分配的槽位安装资源
    ///
    /// 既用于同步创建，也用于把 `Pending` 槽位填充为真正的资源。
    /// 已有的资源会被替换。
    pub fn assign(&mut self, id: Id, setup: R::Setup, state: ResourceState) -> &mut R {
        let slot = self.live_slot_mut(id).unwrap_or_else(|| {
            panic!("Cannot assign to {}: slot is not allocated", id)
        });
        slot.state = state;
        slot.resource.insert(R::from_setup(setup))
    }

    /// 更新槽位状态
    pub fn update_state(&mut self, id: Id, state: ResourceState) {
        debug_assert!(state != ResourceState::InvalidState);
        let slot = self.live_slot_mut(id).unwrap_or_else(|| {
            panic!("Cannot update state of {}: slot is not allocated", id)
        });
        slot.state = state;
    }

    /// 查询状态，句柄无法解析时返回 `InvalidState`
    pub fn query_state(&self, id: Id) -> ResourceState {
        self.live_slot(id)
            .map(|slot| slot.state)
            .unwrap_or(ResourceState::InvalidState)
    }

    /// 句柄是否指向存活的槽位
    pub fn contains(&self, id: Id) -> bool {
        self.live_slot(id).is_some()
    }

    /// 释放槽位
    ///
    /// 丢弃资源、代数加一并归还空闲列表。句柄已失效时什么都不做。
    pub fn unassign(&mut self, id: Id) {
        let Some(slot) = self.live_slot_mut(id) else {
            return;
        };
        slot.resource = None;
        slot.occupied = false;
        slot.state = ResourceState::Initial;
        slot.generation = match slot.generation.wrapping_add(1) {
            Id::INVALID_GENERATION => 1,
            generation => generation,
        };
        self.free_slots.push_back(id.slot);
    }

    /// 获取资源，槽位未填充或句柄失效时返回 `None`
    pub fn lookup(&self, id: Id) -> Option<&R> {
        self.live_slot(id).and_then(|slot| slot.resource.as_ref())
    }

    pub fn lookup_mut(&mut self, id: Id) -> Option<&mut R> {
        self.live_slot_mut(id).and_then(|slot| slot.resource.as_mut())
    }

    /// 单个资源的状态快照
    ///
    /// 标签由注册表提供，这里留空。
    pub fn query_resource_info(&self, id: Id) -> ResourceInfo {
        match self.live_slot(id) {
            Some(slot) => ResourceInfo {
                id,
                kind: R::KIND,
                state: slot.state,
                locator: slot
                    .resource
                    .as_ref()
                    .map(|r| r.setup().locator().clone())
                    .unwrap_or_else(Locator::non_shared),
                label: None,
            },
            None => ResourceInfo::invalid(id),
        }
    }

    /// 资源池占用统计
    pub fn query_pool_info(&self) -> ResourcePoolInfo {
        let mut info = ResourcePoolInfo {
            kind: R::KIND,
            num_slots: self.slots.len(),
            num_used_slots: 0,
            num_free_slots: self.free_slots.len(),
            num_pending: 0,
            num_valid: 0,
            num_failed: 0,
        };
        for slot in self.slots.iter().filter(|s| s.occupied) {
            info.num_used_slots += 1;
            match slot.state {
                ResourceState::Pending => info.num_pending += 1,
                ResourceState::Valid => info.num_valid += 1,
                ResourceState::Failed => info.num_failed += 1,
                _ => {}
            }
        }
        info
    }

    pub fn num_free_slots(&self) -> usize {
        self.free_slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// 每帧维护
    ///
    /// 目前没有需要周期性处理的资源池，保持为空操作。
    pub fn update(&mut self) {}

    fn live_slot(&self, id: Id) -> Option<&Slot<R>> {
        if id.kind != R::KIND || !id.is_valid() {
            return None;
        }
        self.slots
            .get(id.slot as usize)
            .filter(|slot| slot.occupied && slot.generation == id.generation)
    }

    fn live_slot_mut(&mut self, id: Id) -> Option<&mut Slot<R>> {
        if id.kind != R::KIND || !id.is_valid() {
            return None;
        }
        self.slots
            .get_mut(id.slot as usize)
            .filter(|slot| slot.occupied && slot.generation == id.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::{IndexType, Mesh, MeshSetup, Vertex};
    use crate::resource::id::ResourceKind;

    fn setup(name: &str) -> MeshSetup {
        MeshSetup::from_data(name, Vertex::layout(), 3, 0, IndexType::None)
    }

    #[test]
    fn test_alloc_assign_lookup() {
        let mut pool = ResourcePool::<Mesh>::new(4);
        let id = pool.alloc_id();
        assert_eq!(id.kind, ResourceKind::Mesh);
        assert_eq!(pool.query_state(id), ResourceState::Initial);
        assert!(pool.lookup(id).is_none());

        pool.assign(id, setup("tri"), ResourceState::Setup);
        pool.update_state(id, ResourceState::Valid);

        assert_eq!(pool.query_state(id), ResourceState::Valid);
        assert_eq!(pool.lookup(id).map(|m| m.setup().num_vertices), Some(3));
        assert_eq!(pool.query_resource_info(id).locator, Locator::new("tri"));
        assert_eq!(pool.num_free_slots(), 3);
    }

    #[test]
    fn test_unassign_invalidates_stale_id() {
        let mut pool = ResourcePool::<Mesh>::new(1);
        let old = pool.alloc_id();
        pool.assign(old, setup("a"), ResourceState::Valid);
        pool.unassign(old);

        assert!(!pool.contains(old));
        assert_eq!(pool.query_state(old), ResourceState::InvalidState);

        // 同一个槽位被重新分配，旧句柄依然无效
        let new = pool.alloc_id();
        assert_eq!(new.slot, old.slot);
        assert_ne!(new.generation, old.generation);
        assert!(!pool.contains(old));
        assert!(pool.lookup(old).is_none());
        assert!(pool.contains(new));

        // 对失效句柄重复释放不影响新资源
        pool.unassign(old);
        assert!(pool.contains(new));
    }

    #[test]
    fn test_foreign_kind_id_is_not_contained() {
        let mut pool = ResourcePool::<Mesh>::new(2);
        let id = pool.alloc_id();
        let foreign = Id::new(ResourceKind::Texture, id.slot, id.generation);
        assert!(!pool.contains(foreign));
        assert!(!pool.contains(Id::invalid()));
    }

    #[test]
    fn test_pool_info_counts() {
        let mut pool = ResourcePool::<Mesh>::new(4);
        let a = pool.alloc_id();
        let b = pool.alloc_id();
        let c = pool.alloc_id();
        pool.assign(a, setup("a"), ResourceState::Valid);
        pool.assign(b, setup("b"), ResourceState::Pending);
        pool.assign(c, setup("c"), ResourceState::Failed);

        let info = pool.query_pool_info();
        assert_eq!(info.num_slots, 4);
        assert_eq!(info.num_used_slots, 3);
        assert_eq!(info.num_free_slots, 1);
        assert_eq!((info.num_valid, info.num_pending, info.num_failed), (1, 1, 1));
    }

    #[test]
    fn test_capacity_allocations_succeed() {
        let mut pool = ResourcePool::<Mesh>::new(3);
        for _ in 0..3 {
            pool.alloc_id();
        }
        assert_eq!(pool.num_free_slots(), 0);
    }

    #[test]
    #[should_panic(expected = "Mesh pool exhausted")]
    fn test_alloc_past_capacity_panics() {
        let mut pool = ResourcePool::<Mesh>::new(3);
        for _ in 0..4 {
            pool.alloc_id();
        }
    }
}
