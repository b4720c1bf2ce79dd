//! 模拟设备内存
//!
//! 按预算分配对象编号并跟踪存活对象，供无头后端的工厂共享。

use std::collections::HashMap;

use crate::core::error::GraphicsError;
use crate::gfx::resources::GpuObject;
use crate::resource::ResourceKind;

/// 模拟的设备内存
#[derive(Debug)]
pub struct DeviceMemory {
    budget: u64,
    used: u64,
    next_raw: u64,
    live: HashMap<u64, (ResourceKind, u64)>,
}

impl DeviceMemory {
    /// 创建设备内存
    ///
    /// # 参数
    ///
    /// * `budget` - 可用字节数
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            used: 0,
            next_raw: 1,
            live: HashMap::new(),
        }
    }

    /// 分配后端对象
    pub fn allocate(&mut self, kind: ResourceKind, size: u64) -> Result<GpuObject, GraphicsError> {
        let available = self.available();
        if size > available {
            return Err(GraphicsError::OutOfMemory {
                requested: size,
                available,
            });
        }
        let raw = self.next_raw;
        self.next_raw += 1;
        self.used += size;
        self.live.insert(raw, (kind, size));
        Ok(GpuObject { raw, size })
    }

    /// 释放后端对象，重复释放返回 `false`
    pub fn free(&mut self, object: GpuObject) -> bool {
        match self.live.remove(&object.raw) {
            Some((_, size)) => {
                self.used -= size;
                true
            }
            None => false,
        }
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn available(&self) -> u64 {
        self.budget - self.used
    }

    /// 某种资源的存活对象数
    pub fn num_live(&self, kind: ResourceKind) -> usize {
        self.live.values().filter(|(k, _)| *k == kind).count()
    }

    pub fn num_live_total(&self) -> usize {
        self.live.len()
    }
}
