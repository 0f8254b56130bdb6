//! 帧循环（FrameLoop）
//!
//! 没有自带主循环的宿主使用：以固定间隔推进 `FrameSignal`，
//! 返回可用于关闭/等待的 `FrameLoopHandle`。
//!
use crate::config::HostConfig;
use crate::error::{HostError, HostResult};
use crate::frame::FrameSignal;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, debug_span, trace, warn};

pub struct FrameLoop;

impl FrameLoop {
    /// 启动帧循环；必须在 tokio 运行时内调用
    pub fn start(config: &HostConfig, signal: FrameSignal) -> HostResult<FrameLoopHandle> {
        if config.frame_interval.is_zero() {
            return Err(HostError::InvalidFrameInterval(config.frame_interval));
        }

        let token = CancellationToken::new();
        let interval = config.frame_interval;
        let behavior: MissedTickBehavior = config.missed_frames.into();
        let span = debug_span!("frame_loop", ?interval);

        let task = tokio::spawn({
            let token = token.clone();
            async move {
                let mut ticker = time::interval(interval);
                ticker.set_missed_tick_behavior(behavior);
                // 首个 tick 立即完成，跳过以保证第一帧在一个间隔之后
                ticker.tick().await;

                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = ticker.tick() => {
                            let frame = signal.advance();
                            trace!(frame, "frame");
                        }
                    }
                }
                debug!(frame = signal.frame(), "frame loop stopped");
            }
            .instrument(span)
        });

        Ok(FrameLoopHandle {
            token,
            task: Some(task),
        })
    }
}

/// 帧循环句柄：用于关闭与等待；丢弃时自动关闭
pub struct FrameLoopHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl FrameLoopHandle {
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.task.as_ref().is_none_or(|t| t.is_finished())
    }

    /// 等待帧循环退出；正常退出返回 `true`，循环任务 panic 时记录告警并返回 `false`
    pub async fn join(mut self) -> bool {
        let Some(task) = self.task.take() else {
            return true;
        };
        match task.await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "frame loop terminated abnormally");
                false
            }
        }
    }
}

impl Drop for FrameLoopHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(ms: u64) -> HostConfig {
        HostConfig::builder()
            .frame_interval(Duration::from_millis(ms))
            .build()
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let err = FrameLoop::start(&config(0), FrameSignal::new()).err().unwrap();
        assert!(matches!(err, HostError::InvalidFrameInterval(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn advances_frames_until_shutdown() {
        let signal = FrameSignal::new();
        let handle = FrameLoop::start(&config(10), signal.clone()).unwrap();

        tokio::time::sleep(Duration::from_millis(55)).await;
        let running = signal.frame();
        assert!(running >= 4, "expected several frames, got {running}");

        handle.shutdown();
        assert!(handle.join().await);

        let stopped = signal.frame();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(signal.frame(), stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_loop() {
        let signal = FrameSignal::new();
        drop(FrameLoop::start(&config(10), signal.clone()).unwrap());

        // 给循环一次机会观察到取消
        tokio::time::sleep(Duration::from_millis(1)).await;
        let frame = signal.frame();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(signal.frame(), frame);
    }

    #[tokio::test]
    async fn join_reports_a_panicked_loop() {
        let handle = FrameLoopHandle {
            token: CancellationToken::new(),
            task: Some(tokio::spawn(async { panic!("frame source exploded") })),
        };
        assert!(!handle.join().await);
    }
}
