//! 帧时钟（FrameClock）协议
//!
//! 由宿主环境提供的两个挂起原语，节流分发与延迟分发依赖它们：
//! - `next_frame`：挂起直到宿主循环的下一帧；
//! - `sleep`：挂起指定的墙钟时长。
//!
//! 本 crate 不提供实现，参见 `framebus-host` 中的 `FrameSignal`。
//!
use async_trait::async_trait;
use std::time::Duration;

/// 帧时钟：节流批次之间等待下一帧、延迟任务等待定时器
#[async_trait]
pub trait FrameClock: Send + Sync {
    /// 挂起直到下一帧
    async fn next_frame(&self);

    /// 挂起 `delay` 时长后恢复
    async fn sleep(&self, delay: Duration);
}
