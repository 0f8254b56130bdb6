//! 监听者注册表（Registry）
//!
//! 普通处理器、异步处理器与过滤器三张互相独立的表，
//! 先按载荷 `TypeId`、再按 `ListenerId` 索引。注册表不含任何分发逻辑，
//! 分发顺序由各分发器基于快照自行决定。
//!
use crate::payload::{BoxedPayload, ListenerId};
use dashmap::DashMap;
use futures_core::future::BoxFuture;
use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::sync::Arc;

pub(crate) type HandlerFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync)) -> anyhow::Result<()> + Send + Sync>;

pub(crate) type AsyncHandlerFn = Arc<
    dyn Fn(Arc<dyn Any + Send + Sync>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync,
>;

pub(crate) type FilterFn =
    Arc<dyn Fn(BoxedPayload) -> anyhow::Result<BoxedPayload> + Send + Sync>;

/// 过滤器条目：闭包 + 优先级（越大越先执行）
#[derive(Clone)]
pub(crate) struct FilterEntry {
    pub(crate) priority: i32,
    pub(crate) f: FilterFn,
}

/// 单张监听表：TypeId -> (ListenerId -> F)
///
/// 内层使用 `BTreeMap`，迭代顺序即 `ListenerId` 顺序，也就是注册顺序。
pub(crate) struct ListenerMap<F> {
    by_type: DashMap<TypeId, BTreeMap<ListenerId, F>>,
}

impl<F> Default for ListenerMap<F> {
    fn default() -> Self {
        Self {
            by_type: DashMap::new(),
        }
    }
}

impl<F: Clone> ListenerMap<F> {
    pub(crate) fn insert(&self, key: TypeId, id: ListenerId, f: F) {
        self.by_type.entry(key).or_default().insert(id, f);
    }

    /// 移除指定条目；若该类型已无条目则一并移除类型键
    pub(crate) fn remove(&self, key: &TypeId, id: ListenerId) -> bool {
        let removed = match self.by_type.get_mut(key) {
            Some(mut listeners) => listeners.remove(&id).is_some(),
            None => return false,
        };
        if removed {
            self.by_type.remove_if(key, |_, listeners| listeners.is_empty());
        }
        removed
    }

    /// 拷贝出当前条目快照，调用方在释放分片锁之后再执行处理器，
    /// 处理器内部可安全地注册/注销。
    pub(crate) fn snapshot(&self, key: &TypeId) -> Option<Vec<(ListenerId, F)>> {
        let listeners = self.by_type.get(key)?;
        if listeners.is_empty() {
            return None;
        }
        Some(
            listeners
                .iter()
                .map(|(id, f)| (*id, f.clone()))
                .collect(),
        )
    }

    pub(crate) fn len(&self, key: &TypeId) -> usize {
        self.by_type.get(key).map(|l| l.len()).unwrap_or(0)
    }
}

/// 进程内监听者注册表
#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) handlers: ListenerMap<HandlerFn>,
    pub(crate) async_handlers: ListenerMap<AsyncHandlerFn>,
    pub(crate) filters: ListenerMap<FilterEntry>,
}
