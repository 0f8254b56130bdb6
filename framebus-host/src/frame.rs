//! 帧信号（FrameSignal）
//!
//! 手动推进的帧源：自带主循环的宿主每帧调用一次 `advance()`，
//! 总线中的节流分发在 `next_frame()` 上等待。
//! 定时等待直接使用 tokio 定时器。
//!
//! 主循环不在 tokio 运行时中时，构建总线需通过 `EventBus::builder().runtime(..)`
//! 指定后台任务所用的运行时。
//!
use async_trait::async_trait;
use framebus_core::FrameClock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// 帧计数广播，克隆共享同一计数
#[derive(Clone, Debug)]
pub struct FrameSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl Default for FrameSignal {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }
}

impl FrameSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 进入下一帧，唤醒所有等待者，返回新的帧号
    pub fn advance(&self) -> u64 {
        let mut frame = 0;
        // 无接收者时 send_modify 依然会更新值
        self.tx.send_modify(|f| {
            *f += 1;
            frame = *f;
        });
        frame
    }

    /// 当前帧号
    pub fn frame(&self) -> u64 {
        *self.tx.borrow()
    }
}

#[async_trait]
impl FrameClock for FrameSignal {
    async fn next_frame(&self) {
        let mut rx = self.tx.subscribe();
        // 发送端由 self 持有，changed 只会在下一次 advance 后返回
        let _ = rx.changed().await;
    }

    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_increments_shared_counter() {
        let signal = FrameSignal::new();
        let clone = signal.clone();
        assert_eq!(signal.frame(), 0);
        assert_eq!(signal.advance(), 1);
        assert_eq!(clone.advance(), 2);
        assert_eq!(signal.frame(), 2);
    }

    #[tokio::test]
    async fn next_frame_waits_for_the_following_advance() {
        let signal = FrameSignal::new();
        signal.advance();

        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move {
                signal.next_frame().await;
                signal.frame()
            })
        };

        // 让等待者先订阅
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        signal.advance();
        assert_eq!(waiter.await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_uses_tokio_timer() {
        let signal = FrameSignal::new();
        let start = tokio::time::Instant::now();
        signal.sleep(Duration::from_millis(40)).await;
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn host_owned_loop_drives_throttled_fire_from_plain_thread() {
        use framebus_core::{Dispatch, EventBus, Payload};
        use std::sync::Mutex;

        struct Tick;
        impl Payload for Tick {}

        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap();
        let signal = FrameSignal::new();
        let bus = EventBus::builder()
            .clock(Arc::new(signal.clone()))
            .runtime(rt.handle().clone())
            .build();

        let frames = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..4 {
            let frames = frames.clone();
            let signal = signal.clone();
            bus.register::<Tick, _>(move |_| {
                frames.lock().unwrap().push(signal.frame());
                Ok(())
            });
        }

        // 调用方线程不在运行时中，首批同步执行，其余交给绑定的运行时
        let Dispatch::Throttled(handle) = bus.fire(Tick, 2).unwrap() else {
            panic!("expected a throttled dispatch");
        };
        while !handle.is_finished() {
            signal.advance();
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(rt.block_on(handle.join()).unwrap(), 4);

        let frames = frames.lock().unwrap().clone();
        assert_eq!(&frames[..2], &[0, 0]);
        // 第二批在之后的某一帧执行（主循环线程可能在批内继续推进帧号）
        assert!(frames[2] > 0);
        assert!(frames[3] >= frames[2]);
    }
}
