//! 资源注册表
//!
//! 维护三类映射：
//! - 共享定位符 -> 句柄，用于创建去重
//! - 句柄 -> 条目位置，用于诊断查询
//! - 标签路径 -> 句柄，用于按标签批量销毁
//!
//! 条目按插入顺序保存，`remove` 返回的句柄顺序与创建顺序一致。

use std::collections::HashMap;

use super::id::Id;
use super::label::ResourceLabel;
use super::locator::Locator;

/// 注册表条目
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub locator: Locator,
    pub id: Id,
    /// 创建时的标签路径，最后一个元素是创建时的栈顶标签
    pub labels: Vec<ResourceLabel>,
}

impl RegistryEntry {
    fn owned_by(&self, label: ResourceLabel) -> bool {
        label.is_all() || self.labels.contains(&label)
    }
}

/// 资源注册表
#[derive(Debug)]
pub struct ResourceRegistry {
    entries: Vec<RegistryEntry>,
    by_locator: HashMap<Locator, Id>,
    by_id: HashMap<Id, usize>,
    capacity: usize,
}

impl ResourceRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            by_locator: HashMap::with_capacity(capacity),
            by_id: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    /// 按定位符查找句柄
    ///
    /// 非共享定位符或未注册的定位符返回无效句柄。
    pub fn lookup(&self, locator: &Locator) -> Id {
        if !locator.is_shared() {
            return Id::invalid();
        }
        self.by_locator.get(locator).copied().unwrap_or_default()
    }

    /// 注册新条目
    ///
    /// 容量耗尽或共享定位符重复注册都是致命错误。
    pub fn add(&mut self, locator: Locator, id: Id, labels: Vec<ResourceLabel>) {
        assert!(
            self.entries.len() < self.capacity,
            "Resource registry is full (capacity {})",
            self.capacity
        );
        debug_assert!(!labels.is_empty());

        if locator.is_shared() {
            let previous = self.by_locator.insert(locator.clone(), id);
            assert!(previous.is_none(), "Locator '{}' is already registered", locator);
        }
        self.by_id.insert(id, self.entries.len());
        self.entries.push(RegistryEntry { locator, id, labels });
    }

    /// 移除标签下的全部条目并返回它们的句柄
    ///
    /// 路径中包含该标签的条目都会被移除，`ResourceLabel::ALL` 移除全部条目。
    pub fn remove(&mut self, label: ResourceLabel) -> Vec<Id> {
        let mut removed = Vec::new();
        let by_locator = &mut self.by_locator;
        self.entries.retain(|entry| {
            if entry.owned_by(label) {
                if entry.locator.is_shared() {
                    by_locator.remove(&entry.locator);
                }
                removed.push(entry.id);
                false
            } else {
                true
            }
        });
        if !removed.is_empty() {
            self.reindex();
        }
        removed
    }

    pub fn contains(&self, id: Id) -> bool {
        self.find(id).is_some()
    }

    /// 资源创建时的栈顶标签
    pub fn label_of(&self, id: Id) -> Option<ResourceLabel> {
        self.find(id).and_then(|entry| entry.labels.last().copied())
    }

    pub fn locator_of(&self, id: Id) -> Option<&Locator> {
        self.find(id).map(|entry| &entry.locator)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn find(&self, id: Id) -> Option<&RegistryEntry> {
        self.by_id.get(&id).map(|&index| &self.entries[index])
    }

    fn reindex(&mut self) {
        self.by_id.clear();
        for (index, entry) in self.entries.iter().enumerate() {
            self.by_id.insert(entry.id, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::id::ResourceKind;

    fn mesh(slot: u16) -> Id {
        Id::new(ResourceKind::Mesh, slot, 1)
    }

    #[test]
    fn test_lookup_shared_locator() {
        let mut registry = ResourceRegistry::new(8);
        registry.add(Locator::new("cube"), mesh(0), vec![ResourceLabel::DEFAULT]);

        assert_eq!(registry.lookup(&Locator::new("cube")), mesh(0));
        assert!(!registry.lookup(&Locator::new("sphere")).is_valid());
        assert_eq!(registry.locator_of(mesh(0)), Some(&Locator::new("cube")));
    }

    #[test]
    fn test_non_shared_entries_are_tracked_but_not_resolvable() {
        let mut registry = ResourceRegistry::new(8);
        registry.add(Locator::non_shared(), mesh(0), vec![ResourceLabel(1)]);
        registry.add(Locator::non_shared(), mesh(1), vec![ResourceLabel(1)]);

        assert!(!registry.lookup(&Locator::non_shared()).is_valid());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.remove(ResourceLabel(1)), vec![mesh(0), mesh(1)]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_by_nested_label() {
        let a = ResourceLabel(1);
        let b = ResourceLabel(2);
        let mut registry = ResourceRegistry::new(8);
        registry.add(Locator::new("x"), mesh(0), vec![a]);
        registry.add(Locator::new("y"), mesh(1), vec![a, b]);
        registry.add(Locator::new("z"), mesh(2), vec![ResourceLabel::DEFAULT]);

        assert_eq!(registry.label_of(mesh(1)), Some(b));
        assert_eq!(registry.remove(b), vec![mesh(1)]);
        assert!(registry.contains(mesh(0)));
        assert!(!registry.lookup(&Locator::new("y")).is_valid());

        assert_eq!(registry.remove(ResourceLabel::ALL), vec![mesh(0), mesh(2)]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_queries_follow_entries_after_remove() {
        let a = ResourceLabel(1);
        let b = ResourceLabel(2);
        let mut registry = ResourceRegistry::new(8);
        registry.add(Locator::new("x"), mesh(0), vec![a]);
        registry.add(Locator::new("y"), mesh(1), vec![b]);
        registry.add(Locator::non_shared(), mesh(2), vec![a]);
        registry.add(Locator::new("w"), mesh(3), vec![b]);

        assert_eq!(registry.remove(a), vec![mesh(0), mesh(2)]);
        assert!(!registry.contains(mesh(0)));
        assert!(!registry.contains(mesh(2)));
        assert_eq!(registry.label_of(mesh(1)), Some(b));
        assert_eq!(registry.locator_of(mesh(3)), Some(&Locator::new("w")));

        registry.add(Locator::new("z"), mesh(4), vec![a]);
        assert_eq!(registry.locator_of(mesh(4)), Some(&Locator::new("z")));
        assert_eq!(registry.label_of(mesh(4)), Some(a));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_locator_panics() {
        let mut registry = ResourceRegistry::new(8);
        registry.add(Locator::new("cube"), mesh(0), vec![ResourceLabel::DEFAULT]);
        registry.add(Locator::new("cube"), mesh(1), vec![ResourceLabel::DEFAULT]);
    }

    #[test]
    #[should_panic(expected = "registry is full")]
    fn test_capacity_overflow_panics() {
        let mut registry = ResourceRegistry::new(1);
        registry.add(Locator::non_shared(), mesh(0), vec![ResourceLabel::DEFAULT]);
        registry.add(Locator::non_shared(), mesh(1), vec![ResourceLabel::DEFAULT]);
    }
}
