//! framebus 的宿主层（framebus-host）
//!
//! `framebus-core` 只依赖抽象的 `FrameClock`，本 crate 提供落地实现：
//! - `FrameSignal`：手动推进的帧源，适合自带主循环的宿主（游戏引擎、UI 事件循环）；
//! - `FrameLoop`：基于 tokio 定时器按固定间隔推进 `FrameSignal`；
//! - `install` / `current` / `uninstall`：进程级总线访问入口；
//! - `Host`：把以上装配在一起，一次启动、一次关闭。
//!
//! 典型用法：
//! ```ignore
//! let host = Host::start(HostConfig::default())?;
//! let bus = framebus_host::current()?;
//! bus.register::<Ping, _>(|_| Ok(()));
//! bus.fire(Ping, 0)?;
//! host.shutdown().await;
//! ```
//!
pub mod config;
mod current;
pub mod error;
pub mod frame;
pub mod frame_loop;
pub mod host;

pub use config::{HostConfig, MissedFrames};
pub use current::{current, install, uninstall};
pub use error::{HostError, HostResult};
pub use frame::FrameSignal;
pub use frame_loop::{FrameLoop, FrameLoopHandle};
pub use host::Host;
