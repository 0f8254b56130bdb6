//! 事件总线统一错误定义
//!
//! "无监听者" 在任何分发模式下都视为成功，不在此列；
//! 这里只收敛处理器失败、异步扇出聚合失败与类型不匹配等情况。
//!
use crate::payload::ListenerId;
use std::fmt;
use thiserror::Error;

/// 单个处理器的失败记录（用于异步扇出的聚合错误）
#[derive(Debug)]
pub struct HandlerFailure {
    pub listener: ListenerId,
    pub error: anyhow::Error,
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.listener, self.error)
    }
}

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BusError {
    // --- 处理器 ---
    #[error("handler failed: payload={payload}, listener={listener}, reason={source}")]
    Handler {
        payload: &'static str,
        listener: ListenerId,
        #[source]
        source: anyhow::Error,
    },
    #[error("{} async handler(s) failed: payload={payload}, first={}", .failures.len(), first_failure(.failures))]
    AsyncHandlers {
        payload: &'static str,
        failures: Vec<HandlerFailure>,
    },

    // --- 调度 ---
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error(
        "no tokio runtime to schedule {operation}; build the bus inside a runtime or pass one with `EventBus::builder().runtime(..)`"
    )]
    NoRuntime { operation: &'static str },
    #[error("scheduled dispatch aborted: {reason}")]
    Aborted { reason: String },
}

fn first_failure(failures: &[HandlerFailure]) -> String {
    failures
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

impl BusError {
    pub(crate) fn handler(payload: &'static str, listener: ListenerId, source: anyhow::Error) -> Self {
        BusError::Handler {
            payload,
            listener,
            source,
        }
    }
}

/// 统一 Result 类型别名
pub type BusResult<T> = Result<T, BusError>;
