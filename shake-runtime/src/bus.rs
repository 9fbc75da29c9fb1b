//! # Bus 模块
//!
//! 类型化的发布/订阅总线，每种效果一条总线。
//!
//! ## 设计说明
//!
//! - 总线是普通对象，由场景上下文持有，通过 `Rc` 交给反馈和震动器，
//!   不存在进程级的全局监听表
//! - 总线只做多播，不做过滤；通道过滤由订阅者自己完成，
//!   因此总线对命令类型完全泛型
//! - 派发是同步的：按注册顺序、在调用线程上依次调用回调
//! - 回调 panic 会直接向上传播，总线不做捕获
//!
//! ```text
//! Feedback.play() ──trigger(&cmd)──► EventBus ──► callback #1 (Shaker A)
//!                                           └──► callback #2 (Shaker B)
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// 监听者标识符
///
/// 由 [`EventBus::register`] 分配，用于按身份注销。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ListenerId({})", self.0)
    }
}

type Callback<C> = Rc<RefCell<dyn FnMut(&C)>>;

/// 事件总线
pub struct EventBus<C> {
    /// 已注册的回调（按注册顺序）
    listeners: RefCell<Vec<(ListenerId, Callback<C>)>>,
    /// 下一个监听者 ID
    next_id: Cell<u64>,
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for EventBus<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<C> EventBus<C> {
    /// 创建空总线
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// 注册回调，追加到监听列表末尾
    pub fn register<F>(&self, callback: F) -> ListenerId
    where
        F: FnMut(&C) + 'static,
    {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let callback: Callback<C> = Rc::new(RefCell::new(callback));
        self.listeners.borrow_mut().push((id, callback));
        id
    }

    /// 注销回调
    ///
    /// # 返回
    /// - `true`: 找到并移除
    /// - `false`: 该 ID 未注册（或已注销）
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener, _)| *listener != id);
        listeners.len() != before
    }

    /// 派发命令给所有监听者
    ///
    /// 派发前对监听列表做快照，回调中的注册/注销不影响本次派发。
    ///
    /// # 返回
    /// 被调用的回调数量
    pub fn trigger(&self, event: &C) -> usize {
        let snapshot: Vec<Callback<C>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();

        for callback in &snapshot {
            let mut callback = callback.borrow_mut();
            (*callback)(event);
        }
        snapshot.len()
    }

    /// 已注册的监听者数量
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// 是否没有任何监听者
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// 移除所有监听者
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_trigger_in_order() {
        let bus: EventBus<u32> = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = Rc::clone(&log);
        bus.register(move |v: &u32| l1.borrow_mut().push(("a", *v)));
        let l2 = Rc::clone(&log);
        bus.register(move |v: &u32| l2.borrow_mut().push(("b", *v)));

        assert_eq!(bus.trigger(&7), 2);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unregister_by_identity() {
        let bus: EventBus<u32> = EventBus::new();
        let hits = Rc::new(Cell::new(0));

        let h1 = Rc::clone(&hits);
        let first = bus.register(move |_| h1.set(h1.get() + 1));
        let h2 = Rc::clone(&hits);
        let second = bus.register(move |_| h2.set(h2.get() + 10));
        assert_ne!(first, second);

        assert!(bus.unregister(first));
        assert!(!bus.unregister(first));
        assert_eq!(bus.listener_count(), 1);

        bus.trigger(&0);
        assert_eq!(hits.get(), 10);
    }

    #[test]
    fn test_trigger_without_listeners() {
        let bus: EventBus<String> = EventBus::default();
        assert!(bus.is_empty());
        assert_eq!(bus.trigger(&"nobody".to_string()), 0);
    }

    #[test]
    fn test_registration_during_dispatch_waits_for_next_trigger() {
        let bus: Rc<EventBus<u32>> = Rc::new(EventBus::new());
        let hits = Rc::new(Cell::new(0));

        let bus_inner = Rc::clone(&bus);
        let hits_inner = Rc::clone(&hits);
        bus.register(move |_| {
            let h = Rc::clone(&hits_inner);
            bus_inner.register(move |_| h.set(h.get() + 1));
        });

        assert_eq!(bus.trigger(&1), 1);
        assert_eq!(hits.get(), 0);
        assert_eq!(bus.listener_count(), 2);

        bus.trigger(&2);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    #[should_panic(expected = "listener defect")]
    fn test_callback_panic_propagates() {
        let bus: EventBus<u32> = EventBus::new();
        bus.register(|_| panic!("listener defect"));
        bus.trigger(&1);
    }

    #[test]
    fn test_clear() {
        let bus: EventBus<u32> = EventBus::new();
        bus.register(|_| {});
        bus.register(|_| {});
        bus.clear();
        assert!(bus.is_empty());
    }
}
