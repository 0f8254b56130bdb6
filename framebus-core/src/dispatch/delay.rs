//! 延迟分发与防抖（fire_after / callback_after）
//!
//! 两者共用同一模式："等待 delay，然后执行"。
//! - 开启防抖时，以载荷类型或回调标识为键：已有待执行的请求则直接丢弃新请求，
//!   不会创建新的定时器；
//! - 定时器到期后按到期时刻的注册表执行分发（可节流），结束后复位防抖标记，
//!   无监听者、处理器失败或任务 panic 时同样复位。
//!
use super::DispatchHandle;
use crate::bus::EventBus;
use crate::error::{BusError, BusResult};
use crate::payload::{AsAny, BoxedPayload, Callback, ListenerId, Payload};
use dashmap::DashMap;
use std::any::TypeId;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{Instrument, debug, debug_span, warn};

/// 防抖键：按载荷类型（延迟事件）或按回调标识（延迟回调）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum DebounceKey {
    Payload(TypeId),
    Callback(ListenerId),
}

/// 防抖标记表：首次使用时惰性创建，只复位不删除
#[derive(Default)]
pub(crate) struct DebounceFlags {
    pending: DashMap<DebounceKey, bool>,
}

impl DebounceFlags {
    /// 若该键当前无待执行请求则置位并返回 `true`
    fn try_acquire(&self, key: DebounceKey) -> bool {
        let mut pending = self.pending.entry(key).or_insert(false);
        if *pending {
            return false;
        }
        *pending = true;
        true
    }

    fn release(&self, key: DebounceKey) {
        if let Some(mut pending) = self.pending.get_mut(&key) {
            *pending = false;
        }
    }

    fn is_pending(&self, key: DebounceKey) -> bool {
        self.pending.get(&key).map(|p| *p).unwrap_or(false)
    }
}

/// 随延迟任务一起移动，任务结束（含失败与 panic 展开）时复位标记
struct DebounceGuard {
    bus: EventBus,
    key: DebounceKey,
}

impl Drop for DebounceGuard {
    fn drop(&mut self) {
        self.bus.inner.debounce.release(self.key);
    }
}

impl EventBus {
    /// 延迟 `delay` 后分发载荷
    ///
    /// - `debounce`：同一载荷类型已有待执行请求时丢弃本次请求并返回 `None`；
    /// - `max_per_frame`：到期后的分发同 `fire` 一样可按帧节流。
    ///
    /// 定时任务在总线绑定的 tokio 运行时（或调用方所在的运行时）中执行；
    /// 两者都没有时返回 `BusError::NoRuntime`，防抖标记保持不变。
    pub fn fire_after<E: Payload>(
        &self,
        payload: E,
        delay: Duration,
        debounce: bool,
        max_per_frame: usize,
    ) -> BusResult<Option<DispatchHandle>> {
        let name = payload.payload_name();
        self.schedule_fire(
            TypeId::of::<E>(),
            name,
            Box::new(payload),
            delay,
            debounce,
            max_per_frame,
        )
    }

    /// `fire_after` 的装箱版本，按内部具体类型路由与防抖
    pub fn fire_after_dyn(
        &self,
        payload: Box<dyn Payload>,
        delay: Duration,
        debounce: bool,
        max_per_frame: usize,
    ) -> BusResult<Option<DispatchHandle>> {
        let name = payload.payload_name();
        let type_id = (*payload).as_any().type_id();
        self.schedule_fire(
            type_id,
            name,
            AsAny::into_any(payload),
            delay,
            debounce,
            max_per_frame,
        )
    }

    /// 延迟 `delay` 后执行回调；防抖键为回调自身的标识
    ///
    /// 运行时要求与 `fire_after` 相同。
    pub fn callback_after(
        &self,
        callback: &Callback,
        delay: Duration,
        debounce: bool,
    ) -> BusResult<Option<DispatchHandle>> {
        let runtime = self.spawner("delayed callback")?;
        let Some(guard) = self.debounce_guard(DebounceKey::Callback(callback.id()), debounce)
        else {
            return Ok(None);
        };
        let bus = self.clone();
        let callback = callback.clone();
        let span = debug_span!(
            "delayed_callback",
            bus = %self.inner.name,
            listener = %callback.id(),
            ?delay
        );

        Ok(Some(self.spawn_delayed(runtime, span, async move {
            let _guard = guard;
            bus.inner.clock.sleep(delay).await;
            debug!("timer elapsed");
            callback
                .invoke()
                .map(|()| 1)
                .map_err(|e| BusError::handler("callback", callback.id(), e))
        })))
    }

    pub fn is_debounced<E: Payload>(&self) -> bool {
        self.inner
            .debounce
            .is_pending(DebounceKey::Payload(TypeId::of::<E>()))
    }

    pub fn is_callback_debounced(&self, callback: &Callback) -> bool {
        self.inner
            .debounce
            .is_pending(DebounceKey::Callback(callback.id()))
    }

    fn schedule_fire(
        &self,
        type_id: TypeId,
        name: &'static str,
        payload: BoxedPayload,
        delay: Duration,
        debounce: bool,
        max_per_frame: usize,
    ) -> BusResult<Option<DispatchHandle>> {
        let runtime = self.spawner("delayed fire")?;
        let Some(guard) = self.debounce_guard(DebounceKey::Payload(type_id), debounce) else {
            return Ok(None);
        };
        let bus = self.clone();
        let span = debug_span!(
            "delayed_dispatch",
            bus = %self.inner.name,
            payload = name,
            ?delay
        );

        Ok(Some(self.spawn_delayed(runtime, span, async move {
            let _guard = guard;
            bus.inner.clock.sleep(delay).await;
            debug!("timer elapsed");
            bus.dispatch_to_end(type_id, name, payload, max_per_frame)
                .await
        })))
    }

    /// 外层 `None`：请求被防抖丢弃；内层 `None`：未开启防抖
    fn debounce_guard(&self, key: DebounceKey, debounce: bool) -> Option<Option<DebounceGuard>> {
        if !debounce {
            return Some(None);
        }
        if !self.inner.debounce.try_acquire(key) {
            debug!(bus = %self.inner.name, ?key, "debounced, request dropped");
            return None;
        }
        Some(Some(DebounceGuard {
            bus: self.clone(),
            key,
        }))
    }

    fn spawn_delayed<F>(&self, runtime: Handle, span: tracing::Span, work: F) -> DispatchHandle
    where
        F: Future<Output = BusResult<usize>> + Send + 'static,
    {
        let join = runtime.spawn(
            async move {
                work.await
                    .inspect_err(|e| warn!(error = %e, "delayed dispatch aborted"))
            }
            .instrument(span),
        );
        DispatchHandle::new(join)
    }
}
