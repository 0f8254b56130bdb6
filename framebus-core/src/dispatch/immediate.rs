//! 立即分发与按帧节流（fire）
//!
//! ```text
//! fire(payload, max_per_frame)
//!   ├─ 无监听者                      ─► Dispatch::Idle
//!   ├─ max == 0 或 监听者数 < max    ─► 同步执行全部 ─► Dispatch::Completed(n)
//!   └─ 否则（节流）
//!        ├─ 同步执行首批 max 个
//!        └─ spawn { loop { next_frame().await; 执行下一批 } } ─► Dispatch::Throttled(handle)
//! ```
//!
//! 一轮分发使用开始时拍下的快照，期间的注册/注销不影响进行中的这一轮。
//!
use super::{Dispatch, DispatchHandle};
use crate::bus::EventBus;
use crate::clock::FrameClock;
use crate::error::{BusError, BusResult};
use crate::payload::{AsAny, BoxedPayload, ListenerId, Payload};
use crate::registry::HandlerFn;
use std::any::TypeId;
use std::vec;
use tracing::{Instrument, debug, debug_span, trace, warn};

/// 一轮分发的显式状态机：快照 + 游标 + 每帧配额
pub(crate) struct DispatchPass {
    payload_name: &'static str,
    payload: BoxedPayload,
    pending: vec::IntoIter<(ListenerId, HandlerFn)>,
    per_frame: usize,
    invoked: usize,
}

impl DispatchPass {
    /// `per_frame == 0` 表示不限，一帧内执行全部
    pub(crate) fn new(
        payload_name: &'static str,
        payload: BoxedPayload,
        handlers: Vec<(ListenerId, HandlerFn)>,
        per_frame: usize,
    ) -> Self {
        Self {
            payload_name,
            payload,
            pending: handlers.into_iter(),
            per_frame,
            invoked: 0,
        }
    }

    pub(crate) fn invoked(&self) -> usize {
        self.invoked
    }

    /// 执行当前帧的一批；返回 `true` 表示快照已执行完毕。
    /// 任一处理器失败即中止本轮，剩余处理器不再执行。
    pub(crate) fn run_frame(&mut self) -> BusResult<bool> {
        let mut in_frame = 0;
        while let Some((id, handler)) = self.pending.next() {
            trace!(payload = self.payload_name, listener = %id, "invoke handler");
            handler(self.payload.as_mut())
                .map_err(|e| BusError::handler(self.payload_name, id, e))?;
            self.invoked += 1;
            in_frame += 1;

            if self.per_frame > 0 && in_frame == self.per_frame {
                return Ok(self.pending.len() == 0);
            }
        }
        Ok(true)
    }

    /// 从当前位置开始，每帧一批直至结束（首批不等待）
    pub(crate) async fn run_to_end(mut self, clock: &dyn FrameClock) -> BusResult<usize> {
        while !self.run_frame()? {
            clock.next_frame().await;
        }
        Ok(self.invoked)
    }

    /// 首批已执行过时使用：先等待下一帧再继续
    async fn resume(mut self, clock: &dyn FrameClock) -> BusResult<usize> {
        loop {
            clock.next_frame().await;
            if self.run_frame()? {
                return Ok(self.invoked);
            }
        }
    }
}

/// 每帧配额：未设上限或监听者少于上限时不节流
pub(crate) fn frame_budget(listeners: usize, max_per_frame: usize) -> usize {
    if max_per_frame == 0 || listeners < max_per_frame {
        0
    } else {
        max_per_frame
    }
}

impl EventBus {
    /// 立即分发给载荷具体类型的全部普通处理器
    ///
    /// - `max_per_frame == 0`：不节流；
    /// - 否则每帧最多执行 `max_per_frame` 个处理器，剩余部分在后台任务中逐帧继续。
    ///
    /// 首批中的处理器错误直接返回；后续批次的错误体现在 `DispatchHandle::join` 中。
    ///
    /// 需要跨帧时，后续批次在总线绑定的 tokio 运行时（或调用方所在的运行时）中执行；
    /// 两者都没有时返回 `BusError::NoRuntime`，且不会执行任何处理器。
    pub fn fire<E: Payload>(&self, payload: E, max_per_frame: usize) -> BusResult<Dispatch> {
        let name = payload.payload_name();
        self.fire_erased(TypeId::of::<E>(), name, Box::new(payload), max_per_frame)
    }

    /// 按装箱载荷内部的具体类型分发
    pub fn fire_dyn(&self, payload: Box<dyn Payload>, max_per_frame: usize) -> BusResult<Dispatch> {
        let name = payload.payload_name();
        let type_id = (*payload).as_any().type_id();
        self.fire_erased(type_id, name, AsAny::into_any(payload), max_per_frame)
    }

    fn fire_erased(
        &self,
        type_id: TypeId,
        name: &'static str,
        payload: BoxedPayload,
        max_per_frame: usize,
    ) -> BusResult<Dispatch> {
        let Some(handlers) = self.inner.registry.handlers.snapshot(&type_id) else {
            trace!(bus = %self.inner.name, payload = name, "no listeners");
            return Ok(Dispatch::Idle);
        };

        let per_frame = frame_budget(handlers.len(), max_per_frame);
        debug!(
            bus = %self.inner.name,
            payload = name,
            listeners = handlers.len(),
            per_frame,
            "fire"
        );

        // 需要跨帧时先确认有运行时可用，避免首批执行后才失败
        let runtime = if per_frame > 0 && handlers.len() > per_frame {
            Some(self.spawner("throttled fire")?)
        } else {
            None
        };

        let mut pass = DispatchPass::new(name, payload, handlers, per_frame);
        if pass.run_frame()? {
            return Ok(Dispatch::Completed(pass.invoked()));
        }
        let runtime = match runtime {
            Some(runtime) => runtime,
            None => self.spawner("throttled fire")?,
        };

        let clock = self.inner.clock.clone();
        let span = debug_span!("throttled_dispatch", bus = %self.inner.name, payload = name);
        let join = runtime.spawn(
            async move {
                pass.resume(clock.as_ref())
                    .await
                    .inspect_err(|e| warn!(error = %e, "throttled dispatch aborted"))
            }
            .instrument(span),
        );
        Ok(Dispatch::Throttled(DispatchHandle::new(join)))
    }

    /// 在当前任务中完成一轮（可节流的）分发，供延迟分发在定时器到期后使用；
    /// 监听者取到期时刻的注册表快照。
    pub(crate) async fn dispatch_to_end(
        &self,
        type_id: TypeId,
        name: &'static str,
        payload: BoxedPayload,
        max_per_frame: usize,
    ) -> BusResult<usize> {
        let Some(handlers) = self.inner.registry.handlers.snapshot(&type_id) else {
            trace!(payload = name, "no listeners at resume");
            return Ok(0);
        };

        let per_frame = frame_budget(handlers.len(), max_per_frame);
        DispatchPass::new(name, payload, handlers, per_frame)
            .run_to_end(self.inner.clock.as_ref())
            .await
    }
}
