//! 帧循环应用的进程内类型化事件总线（framebus-core）
//!
//! 生产者构造类型化载荷交给总线，消费者按载荷类型注册处理器，双方互不感知。
//! 载荷的具体类型即路由键，提供四种分发模式与一条过滤链：
//! - 立即分发（`fire`），可按帧节流，每帧最多执行 N 个处理器；
//! - 延迟分发（`fire_after` / `callback_after`），支持按载荷类型或回调标识防抖；
//! - 异步扇出（`fire_async`），并发执行全部异步处理器并等待全部结束；
//! - 过滤链（`apply_filter`），按优先级从高到低折叠改写载荷。
//!
//! 宿主需提供 `FrameClock`（下一帧与定时等待两个挂起原语），
//! 参考实现见 `framebus-host`。
//!
//! 典型用法：
//! 1. 为载荷类型实现 `Payload`（通常 `#[derive(Payload)]`）；
//! 2. 以宿主时钟构建 `EventBus`，并注入到各组件；
//! 3. 各组件 `register*` 并保存返回的 `ListenerId`，用于之后的 `unregister*`；
//! 4. 生产者通过任一分发入口发布载荷，"无监听者" 视为成功。
//!
pub mod bus;
pub mod clock;
pub mod dispatch;
pub mod error;
pub mod payload;
mod registry;

pub use bus::EventBus;
pub use clock::FrameClock;
pub use dispatch::{Dispatch, DispatchHandle};
pub use error::{BusError, BusResult, HandlerFailure};
pub use payload::{Callback, ListenerId, Payload};

// 允许在本 crate 内部通过 ::framebus_core 进行自引用，
// 以便派生宏在本 crate 的测试中也能解析到 ::framebus_core 路径。
extern crate self as framebus_core;
