//! 运行：RUST_LOG=framebus_core=debug cargo run -p framebus-host --example frame_loop
use framebus_core::Callback;
use framebus_host::{Host, HostConfig, current};
use framebus_macros::Payload;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Payload)]
#[payload(name = "inventory.changed")]
struct InventoryChanged {
    slot: usize,
}

#[derive(Debug, Payload)]
struct SaveRequested;

#[derive(Debug, Payload)]
struct Damage(i32);

#[derive(Debug, Payload)]
struct Screenshot {
    frame: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let host = Host::start(
        HostConfig::builder()
            .frame_interval(Duration::from_millis(16))
            .bus_name("demo")
            .build(),
    )?;
    let bus = current()?;

    // 每帧最多刷新 4 个格子
    for slot in 0..10 {
        let signal = host.signal().clone();
        bus.register::<InventoryChanged, _>(move |e| {
            info!(slot, changed = e.slot, frame = signal.frame(), "refresh slot");
            Ok(())
        });
    }
    let refreshed = bus.fire(InventoryChanged { slot: 3 }, 4)?.finish().await?;
    info!(refreshed, "inventory refreshed");

    // 连续的保存请求合并为一次
    bus.register::<SaveRequested, _>(|_| {
        info!("saving");
        Ok(())
    });
    let save = bus.fire_after(SaveRequested, Duration::from_millis(200), true, 0)?;
    for _ in 0..5 {
        let dropped = bus.fire_after(SaveRequested, Duration::from_millis(200), true, 0)?;
        debug_assert!(dropped.is_none());
    }
    if let Some(save) = save {
        save.join().await?;
    }

    let toast = Callback::new(|| {
        info!("toast dismissed");
        Ok(())
    });
    if let Some(pending) = bus.callback_after(&toast, Duration::from_millis(100), true)? {
        pending.join().await?;
    }

    // 护甲减半，之后再扣除固定抗性
    bus.register_filter::<Damage, _>(|d| Ok(Damage(d.0 / 2)), 10);
    bus.register_filter::<Damage, _>(|d| Ok(Damage((d.0 - 3).max(0))), 0);
    let damage = bus.apply_filter(Damage(40))?;
    info!(damage = damage.0, "damage after filters");

    let written = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    for store in ["disk", "cloud"] {
        let written = written.clone();
        bus.register_async::<Screenshot, _, _>(move |shot| {
            let written = written.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                written.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                info!(store, frame = shot.frame, "screenshot stored");
                anyhow::Ok(())
            }
        });
    }
    bus.fire_async(Screenshot {
        frame: host.signal().frame(),
    })
    .await?;
    info!(stored = written.load(std::sync::atomic::Ordering::SeqCst), "screenshots stored");

    host.shutdown().await;
    Ok(())
}
