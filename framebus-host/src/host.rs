//! 宿主（Host）
//!
//! 把帧信号、帧循环与总线装配在一起：启动时构建并安装进程级总线，
//! 关闭时停止帧循环并卸载。
//!
use crate::config::HostConfig;
use crate::current::{install, uninstall_if};
use crate::error::HostResult;
use crate::frame::FrameSignal;
use crate::frame_loop::{FrameLoop, FrameLoopHandle};
use framebus_core::EventBus;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Host {
    bus: EventBus,
    signal: FrameSignal,
    frame_loop: FrameLoopHandle,
}

impl Host {
    /// 启动宿主；必须在 tokio 运行时内调用
    ///
    /// 若进程中已安装其它总线，会被替换。
    pub fn start(config: HostConfig) -> HostResult<Self> {
        let signal = FrameSignal::new();
        let frame_loop = FrameLoop::start(&config, signal.clone())?;

        let bus = EventBus::builder()
            .clock(Arc::new(signal.clone()))
            .name(config.bus_name)
            .build();

        if let Some(previous) = install(bus.clone()) {
            warn!(previous = previous.name(), "replacing installed event bus");
        }
        info!(
            bus = bus.name(),
            frame_interval = ?config.frame_interval,
            "host started"
        );

        Ok(Self {
            bus,
            signal,
            frame_loop,
        })
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn signal(&self) -> &FrameSignal {
        &self.signal
    }

    /// 停止帧循环并等待其退出；若进程级总线仍是本宿主的总线则一并卸载
    pub async fn shutdown(self) {
        let Self {
            bus,
            signal,
            frame_loop,
        } = self;

        frame_loop.shutdown();
        let clean = frame_loop.join().await;
        uninstall_if(&bus);
        info!(bus = bus.name(), frames = signal.frame(), clean, "host stopped");
    }
}
