//! 事件总线（EventBus）
//!
//! 显式的上下文对象：启动时构建一次，按需克隆并注入到需要发布/订阅的组件中。
//! 克隆共享同一份注册表与防抖状态；测试中可并存多个互相独立的实例。
//!
//! 本文件只负责注册/注销与内省，四种分发模式分别位于 `dispatch` 子模块。
//!
use crate::clock::FrameClock;
use crate::dispatch::delay::DebounceFlags;
use crate::error::{BusError, BusResult};
use crate::payload::{BoxedPayload, ListenerId, Payload};
use crate::registry::{AsyncHandlerFn, FilterEntry, FilterFn, HandlerFn, Registry};
use bon::bon;
use futures_core::future::BoxFuture;
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;

/// 进程内类型化事件总线
#[derive(Clone)]
pub struct EventBus {
    pub(crate) inner: Arc<BusInner>,
}

pub(crate) struct BusInner {
    pub(crate) name: String,
    pub(crate) clock: Arc<dyn FrameClock>,
    runtime: Option<Handle>,
    pub(crate) registry: Registry,
    pub(crate) debounce: DebounceFlags,
}

#[bon]
impl EventBus {
    /// 构建总线
    ///
    /// - `clock`：宿主提供的帧时钟（节流与延迟分发依赖）；
    /// - `name`：仅用于日志字段，默认 `framebus`；
    /// - `runtime`：节流后续批次与延迟任务所用的 tokio 运行时。
    ///   未指定时取构建时所在的运行时；两者都没有时，这些操作返回 `BusError::NoRuntime`。
    #[builder]
    pub fn new(
        clock: Arc<dyn FrameClock>,
        #[builder(into, default = String::from("framebus"))] name: String,
        runtime: Option<Handle>,
    ) -> Self {
        Self {
            inner: Arc::new(BusInner {
                name,
                clock,
                runtime: runtime.or_else(|| Handle::try_current().ok()),
                registry: Registry::default(),
                debounce: DebounceFlags::default(),
            }),
        }
    }
}

impl EventBus {
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// 两个句柄是否指向同一条总线
    pub fn ptr_eq(&self, other: &EventBus) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// 后台任务使用的运行时：构建时绑定的优先，其次是调用方所在的运行时
    pub(crate) fn spawner(&self, operation: &'static str) -> BusResult<Handle> {
        self.inner
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
            .ok_or(BusError::NoRuntime { operation })
    }

    // ---- 普通处理器 ----

    /// 注册普通处理器
    ///
    /// 处理器拿到 `&mut E`，对载荷的修改对同一轮分发中后续的处理器可见。
    pub fn register<E, F>(&self, handler: F) -> ListenerId
    where
        E: Payload,
        F: Fn(&mut E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = ListenerId::next();
        let f: HandlerFn = Arc::new(move |payload: &mut (dyn Any + Send + Sync)| {
            // 键与闭包同一泛型 E，正常情况下 downcast 不会失败
            match payload.downcast_mut::<E>() {
                Some(p) => handler(p),
                None => Err(mismatch::<E>()),
            }
        });
        self.inner.registry.handlers.insert(TypeId::of::<E>(), id, f);
        id
    }

    pub fn unregister<E: Payload>(&self, id: ListenerId) -> bool {
        self.inner.registry.handlers.remove(&TypeId::of::<E>(), id)
    }

    pub fn listener_count<E: Payload>(&self) -> usize {
        self.inner.registry.handlers.len(&TypeId::of::<E>())
    }

    // ---- 异步处理器 ----

    /// 注册异步处理器，所有异步处理器共享同一个 `Arc<E>`
    pub fn register_async<E, F, Fut>(&self, handler: F) -> ListenerId
    where
        E: Payload,
        F: Fn(Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let id = ListenerId::next();
        let f: AsyncHandlerFn = Arc::new(
            move |payload: Arc<dyn Any + Send + Sync>| -> BoxFuture<'static, anyhow::Result<()>> {
                match payload.downcast::<E>() {
                    Ok(p) => Box::pin(handler(p)),
                    Err(_) => Box::pin(std::future::ready(Err(mismatch::<E>()))),
                }
            },
        );
        self.inner
            .registry
            .async_handlers
            .insert(TypeId::of::<E>(), id, f);
        id
    }

    pub fn unregister_async<E: Payload>(&self, id: ListenerId) -> bool {
        self.inner
            .registry
            .async_handlers
            .remove(&TypeId::of::<E>(), id)
    }

    pub fn async_listener_count<E: Payload>(&self) -> usize {
        self.inner.registry.async_handlers.len(&TypeId::of::<E>())
    }

    // ---- 过滤器 ----

    /// 注册过滤器，`priority` 越大越先执行；同优先级按注册顺序执行
    pub fn register_filter<E, F>(&self, filter: F, priority: i32) -> ListenerId
    where
        E: Payload,
        F: Fn(E) -> anyhow::Result<E> + Send + Sync + 'static,
    {
        let id = ListenerId::next();
        let f: FilterFn = Arc::new(move |payload: BoxedPayload| {
            let p = payload.downcast::<E>().map_err(|_| mismatch::<E>())?;
            Ok(Box::new(filter(*p)?) as BoxedPayload)
        });
        self.inner
            .registry
            .filters
            .insert(TypeId::of::<E>(), id, FilterEntry { priority, f });
        id
    }

    pub fn unregister_filter<E: Payload>(&self, id: ListenerId) -> bool {
        self.inner.registry.filters.remove(&TypeId::of::<E>(), id)
    }

    pub fn filter_count<E: Payload>(&self) -> usize {
        self.inner.registry.filters.len(&TypeId::of::<E>())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

fn mismatch<E>() -> anyhow::Error {
    anyhow::Error::new(BusError::TypeMismatch {
        expected: type_name::<E>(),
        found: "unknown",
    })
}
