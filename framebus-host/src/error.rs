//! 宿主层错误定义
//!
use framebus_core::BusError;
use std::time::Duration;
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HostError {
    #[error(
        "no event bus attached to this process; build one and attach it with `framebus_host::install` (or start a `Host`)"
    )]
    MissingBus,

    #[error("invalid config: frame_interval must be greater than zero, got {0:?}")]
    InvalidFrameInterval(Duration),

    #[error("bus: {0}")]
    Bus(#[from] BusError),
}

/// 统一 Result 类型别名
pub type HostResult<T> = Result<T, HostError>;
