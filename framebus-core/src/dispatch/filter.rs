//! 优先级过滤链（apply_filter）
//!
//! 多个互不相识的组件依次改写同一载荷：按优先级从高到低折叠，
//! 每个过滤器接收上一个的输出并返回同类型的新值。
//! 同优先级按注册顺序执行（稳定排序）。
//!
use crate::bus::EventBus;
use crate::error::{BusError, BusResult};
use crate::payload::{AsAny, BoxedPayload, Payload};
use std::any::{TypeId, type_name};
use std::cmp::Reverse;
use tracing::trace;

impl EventBus {
    /// 将载荷依次通过该类型的全部过滤器，返回最终值
    ///
    /// 无过滤器时原样返回；任一过滤器失败即中止并返回错误。
    pub fn apply_filter<E: Payload>(&self, payload: E) -> BusResult<E> {
        let name = payload.payload_name();
        let folded = self.fold_filters(TypeId::of::<E>(), name, Box::new(payload))?;
        restore::<E>(folded, name)
    }

    /// 按装箱载荷内部的具体类型执行过滤链，并以 `E` 取回结果
    ///
    /// 载荷的具体类型不是 `E` 时返回 `BusError::TypeMismatch`。
    pub fn apply_filter_dyn<E: Payload>(&self, payload: Box<dyn Payload>) -> BusResult<E> {
        let name = payload.payload_name();
        let type_id = (*payload).as_any().type_id();
        if type_id != TypeId::of::<E>() {
            return Err(BusError::TypeMismatch {
                expected: type_name::<E>(),
                found: name,
            });
        }
        let folded = self.fold_filters(type_id, name, AsAny::into_any(payload))?;
        restore::<E>(folded, name)
    }

    fn fold_filters(
        &self,
        type_id: TypeId,
        name: &'static str,
        payload: BoxedPayload,
    ) -> BusResult<BoxedPayload> {
        let Some(mut filters) = self.inner.registry.filters.snapshot(&type_id) else {
            return Ok(payload);
        };

        // 快照已按注册顺序排列，稳定排序保证同优先级的相对顺序
        filters.sort_by_key(|(_, entry)| Reverse(entry.priority));

        let mut current = payload;
        for (id, entry) in filters {
            trace!(payload = name, listener = %id, priority = entry.priority, "apply filter");
            current = (entry.f)(current).map_err(|e| BusError::handler(name, id, e))?;
        }
        Ok(current)
    }
}

fn restore<E: Payload>(folded: BoxedPayload, name: &'static str) -> BusResult<E> {
    folded
        .downcast::<E>()
        .map(|p| *p)
        .map_err(|_| BusError::TypeMismatch {
            expected: type_name::<E>(),
            found: name,
        })
}
