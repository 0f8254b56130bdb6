use async_trait::async_trait;
use framebus_core::{EventBus, FrameClock};
use framebus_host::{HostError, current, install, uninstall};
use framebus_macros::Payload;
use std::sync::Arc;
use std::time::Duration;

struct Idle;

#[derive(Payload)]
struct Tick;

#[async_trait]
impl FrameClock for Idle {
    async fn next_frame(&self) {
        tokio::task::yield_now().await;
    }

    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

// 进程级状态：整个生命周期放在同一个测试里，避免并行测试互相干扰
#[test]
fn install_current_uninstall_lifecycle() {
    let err = current().unwrap_err();
    assert!(matches!(err, HostError::MissingBus));
    assert!(err.to_string().contains("framebus_host::install"));

    let first = EventBus::builder().clock(Arc::new(Idle)).name("first").build();
    assert!(install(first.clone()).is_none());
    assert!(current().unwrap().ptr_eq(&first));

    let second = EventBus::builder().clock(Arc::new(Idle)).name("second").build();
    let replaced = install(second.clone()).unwrap();
    assert!(replaced.ptr_eq(&first));

    // current 返回的是同一条总线的克隆
    current().unwrap().register::<Tick, _>(|_| Ok(()));
    assert_eq!(second.listener_count::<Tick>(), 1);

    assert!(uninstall().unwrap().ptr_eq(&second));
    assert!(uninstall().is_none());
    assert!(matches!(current(), Err(HostError::MissingBus)));
}
