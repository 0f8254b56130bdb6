use framebus_core::Dispatch;
use framebus_host::{Host, HostConfig, HostError, current};
use framebus_macros::Payload;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Payload)]
struct Redraw;

#[derive(Debug, Payload)]
#[payload(name = "search.query")]
struct Query(String);

// 进程级状态：单个测试覆盖完整生命周期
#[tokio::test(start_paused = true)]
async fn host_drives_throttled_and_delayed_dispatch() {
    let host = Host::start(
        HostConfig::builder()
            .frame_interval(Duration::from_millis(10))
            .bus_name("lifecycle")
            .build(),
    )
    .unwrap();

    let bus = current().unwrap();
    assert!(bus.ptr_eq(host.bus()));
    assert_eq!(bus.name(), "lifecycle");

    // 5 个处理器，每帧最多 2 个：跨越 3 个不同的帧
    let frames = Arc::new(Mutex::new(Vec::new()));
    for _ in 0..5 {
        let frames = frames.clone();
        let signal = host.signal().clone();
        bus.register::<Redraw, _>(move |_| {
            frames.lock().unwrap().push(signal.frame());
            Ok(())
        });
    }
    let dispatch = bus.fire(Redraw, 2).unwrap();
    assert!(dispatch.is_throttled());
    assert_eq!(dispatch.finish().await.unwrap(), 5);

    let frames = frames.lock().unwrap().clone();
    assert!(frames.windows(2).all(|w| w[0] <= w[1]));
    let mut distinct = frames.clone();
    distinct.dedup();
    assert_eq!(distinct.len(), 3);

    // 防抖的延迟分发：连续请求只执行一次
    let queries = Arc::new(AtomicUsize::new(0));
    {
        let queries = queries.clone();
        bus.register::<Query, _>(move |q| {
            assert_eq!(q.0, "ru");
            queries.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    }
    let pending = bus
        .fire_after(Query("ru".into()), Duration::from_millis(50), true, 0)
        .unwrap()
        .unwrap();
    assert!(
        bus.fire_after(Query("rus".into()), Duration::from_millis(50), true, 0)
            .unwrap()
            .is_none()
    );
    assert_eq!(pending.join().await.unwrap(), 1);
    assert_eq!(queries.load(Ordering::SeqCst), 1);
    assert!(!bus.is_debounced::<Query>());

    host.shutdown().await;
    assert!(matches!(current(), Err(HostError::MissingBus)));

    // 显式持有的句柄在宿主关闭后依然可用
    assert!(matches!(bus.fire(Redraw, 0).unwrap(), Dispatch::Completed(5)));
}
