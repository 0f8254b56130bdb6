//! 异步扇出（fire_async）
//!
//! 对同一载荷并发调用全部异步处理器，并在全部结束后汇总：
//! 这是一道汇合屏障而非竞速，某个处理器失败不会取消其它处理器。
//!
use crate::bus::EventBus;
use crate::error::{BusError, BusResult, HandlerFailure};
use crate::payload::{AsAny, Payload};
use futures_util::future::join_all;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::debug;

impl EventBus {
    /// 并发执行载荷类型的全部异步处理器，等待全部完成
    ///
    /// - 无异步处理器时立即返回 `Ok(0)`；
    /// - 任一失败时返回 `BusError::AsyncHandlers`，包含全部失败记录。
    pub async fn fire_async<E: Payload>(&self, payload: E) -> BusResult<usize> {
        let name = payload.payload_name();
        self.fan_out(TypeId::of::<E>(), name, Arc::new(payload)).await
    }

    /// 按装箱载荷内部的具体类型执行异步扇出
    pub async fn fire_async_dyn(&self, payload: Box<dyn Payload>) -> BusResult<usize> {
        let name = payload.payload_name();
        let type_id = (*payload).as_any().type_id();
        self.fan_out(type_id, name, Arc::from(AsAny::into_any(payload)))
            .await
    }

    async fn fan_out(
        &self,
        type_id: TypeId,
        name: &'static str,
        shared: Arc<dyn Any + Send + Sync>,
    ) -> BusResult<usize> {
        let Some(handlers) = self.inner.registry.async_handlers.snapshot(&type_id) else {
            return Ok(0);
        };

        let total = handlers.len();
        debug!(bus = %self.inner.name, payload = name, listeners = total, "fire_async");

        let results = join_all(handlers.into_iter().map(|(id, handler)| {
            let work = handler(shared.clone());
            async move { (id, work.await) }
        }))
        .await;

        let failures: Vec<HandlerFailure> = results
            .into_iter()
            .filter_map(|(listener, result)| {
                result.err().map(|error| HandlerFailure { listener, error })
            })
            .collect();

        if failures.is_empty() {
            Ok(total)
        } else {
            debug!(payload = name, failed = failures.len(), "fire_async finished with failures");
            Err(BusError::AsyncHandlers {
                payload: name,
                failures,
            })
        }
    }
}
