//! 事件载荷（Payload）与监听者标识（ListenerId）
//!
//! 载荷的具体类型（`TypeId`）即路由键：为 `T` 注册的处理器只会收到 `T`，
//! 包装类型或"相关"类型都不会被路由过来。
//!
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 类型擦除辅助：对任意 `'static + Send + Sync` 类型自动实现，
/// 使 `dyn Payload` 能按其内部的具体类型进行路由与还原。
#[doc(hidden)]
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &(dyn Any + Send + Sync);
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

/// 事件载荷标记 trait
///
/// - 通常由 `#[derive(Payload)]` 生成实现；
/// - `payload_name` 仅用于日志与错误信息，不参与路由。
pub trait Payload: AsAny {
    /// 载荷的可读名称
    fn payload_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// 类型擦除后的载荷
pub(crate) type BoxedPayload = Box<dyn Any + Send + Sync>;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// 监听者标识
///
/// 由 `register*` 返回、`unregister*` 消费的显式令牌。
/// 进程内单调递增分配，因此跨总线实例唯一，且大小顺序即注册顺序。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

type CallbackFn = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// 可延迟执行的零参回调
///
/// 创建时分配 `ListenerId`，克隆共享同一标识；
/// `callback_after` 以该标识作为防抖键。
#[derive(Clone)]
pub struct Callback {
    id: ListenerId,
    f: CallbackFn,
}

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            id: ListenerId::next(),
            f: Arc::new(f),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub(crate) fn invoke(&self) -> anyhow::Result<()> {
        (self.f)()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl Payload for Plain {}

    #[test]
    fn listener_ids_follow_allocation_order() {
        let a = ListenerId::next();
        let b = ListenerId::next();
        assert!(a < b);
        assert_ne!(a, b);
    }

    #[test]
    fn default_payload_name_is_type_name() {
        assert!(Plain.payload_name().ends_with("Plain"));
    }

    #[derive(framebus_macros::Payload)]
    #[payload(name = "plain.derived")]
    struct Derived;

    #[test]
    fn derived_payload_uses_configured_name() {
        assert_eq!(Derived.payload_name(), "plain.derived");
    }

    #[test]
    fn boxed_payload_keeps_concrete_type() {
        let boxed: Box<dyn Payload> = Box::new(Plain);
        // 需显式解引用，否则会命中 `Box<dyn Payload>` 自身的 blanket 实现
        assert_eq!((*boxed).as_any().type_id(), std::any::TypeId::of::<Plain>());

        let erased = AsAny::into_any(boxed);
        assert!(erased.downcast::<Plain>().is_ok());
    }

    #[test]
    fn callback_clones_share_identity() {
        let cb = Callback::new(|| Ok(()));
        let other = Callback::new(|| Ok(()));
        assert_eq!(cb.id(), cb.clone().id());
        assert_ne!(cb.id(), other.id());
        assert!(cb.invoke().is_ok());
    }
}
