//! 分发（dispatch）
//!
//! 四种分发入口都以 `impl EventBus` 的形式定义在各子模块中：
//! - `immediate`：`fire` / `fire_dyn`，立即分发，可按帧节流；
//! - `delay`：`fire_after` / `callback_after`，延迟分发与防抖；
//! - `fanout`：`fire_async`，异步处理器并发扇出并等待全部完成；
//! - `filter`：`apply_filter`，按优先级折叠的过滤链。
//!
//! 节流与延迟分发会在后台任务中继续执行，返回 `DispatchHandle` 供调用方等待。
//!
pub(crate) mod delay;
mod fanout;
mod filter;
pub(crate) mod immediate;

use crate::error::{BusError, BusResult};
use tokio::task::JoinHandle;

/// `fire` 的结果
#[derive(Debug)]
pub enum Dispatch {
    /// 没有任何监听者，未执行
    Idle,
    /// 同步执行完毕，携带执行的处理器数量
    Completed(usize),
    /// 首批已同步执行，剩余批次在后续帧中继续
    Throttled(DispatchHandle),
}

impl Dispatch {
    /// 等待分发结束，返回执行的处理器总数
    pub async fn finish(self) -> BusResult<usize> {
        match self {
            Dispatch::Idle => Ok(0),
            Dispatch::Completed(n) => Ok(n),
            Dispatch::Throttled(handle) => handle.join().await,
        }
    }

    pub fn is_throttled(&self) -> bool {
        matches!(self, Dispatch::Throttled(_))
    }
}

/// 后台分发任务句柄
///
/// 丢弃句柄不会取消任务，任务会继续执行到结束。
#[derive(Debug)]
pub struct DispatchHandle {
    join: JoinHandle<BusResult<usize>>,
}

impl DispatchHandle {
    pub(crate) fn new(join: JoinHandle<BusResult<usize>>) -> Self {
        Self { join }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// 等待任务结束，返回执行的处理器数量（延迟回调为 1）
    pub async fn join(self) -> BusResult<usize> {
        match self.join.await {
            Ok(result) => result,
            Err(e) => Err(BusError::Aborted {
                reason: e.to_string(),
            }),
        }
    }
}
