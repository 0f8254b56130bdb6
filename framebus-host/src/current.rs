//! 进程级总线访问入口
//!
//! 核心库只提供显式的 `EventBus` 上下文对象；
//! 希望像单例一样随处取用的宿主，在启动时 `install` 一次，之后通过 `current` 获取克隆。
//! 未安装时访问返回 `HostError::MissingBus`，而不是隐式创建。
//!
use crate::error::{HostError, HostResult};
use framebus_core::EventBus;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

static CURRENT: RwLock<Option<EventBus>> = RwLock::new(None);

/// 安装进程级总线，返回之前安装的总线（如有）
pub fn install(bus: EventBus) -> Option<EventBus> {
    debug!(bus = bus.name(), "install event bus");
    CURRENT
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(bus)
}

/// 获取进程级总线的克隆
pub fn current() -> HostResult<EventBus> {
    CURRENT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or(HostError::MissingBus)
}

/// 卸载进程级总线
pub fn uninstall() -> Option<EventBus> {
    let previous = CURRENT
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(bus) = &previous {
        debug!(bus = bus.name(), "uninstall event bus");
    }
    previous
}

/// 仅当当前安装的就是 `bus` 时才卸载
pub(crate) fn uninstall_if(bus: &EventBus) -> bool {
    let mut slot = CURRENT.write().unwrap_or_else(PoisonError::into_inner);
    if slot.as_ref().is_some_and(|installed| installed.ptr_eq(bus)) {
        *slot = None;
        debug!(bus = bus.name(), "uninstall event bus");
        true
    } else {
        false
    }
}
