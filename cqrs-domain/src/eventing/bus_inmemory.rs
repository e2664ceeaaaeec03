//! 内存版事件总线（InMemoryEventBus）
//!
//! - 按事件类型标签保存处理器列表，同一类型可有多个处理器；
//! - 本地、全局两组兜底处理器接收每个事件；
//! - 同一处理器实例对同一类型（或同一兜底集合）重复注册视为错误；
//!   同一实例既按类型又作为兜底注册时会收到重复投递。
//!
//! 处理器以 `Arc` 指针地址判等。
//!
use crate::error::{DomainError, DomainResult as Result};
use crate::eventing::{EventBus, EventHandler};
use crate::message::EventMessage;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type HandlerKey = usize;

fn handler_key(handler: &Arc<dyn EventHandler>) -> HandlerKey {
    Arc::as_ptr(handler) as *const () as usize
}

#[derive(Default)]
pub struct InMemoryEventBus {
    handlers: DashMap<String, Vec<Arc<dyn EventHandler>>>,
    local_handlers: DashMap<HandlerKey, Arc<dyn EventHandler>>,
    global_handlers: DashMap<HandlerKey, Arc<dyn EventHandler>>,
    // 多类型注册的检查与写入在同一临界区
    registration: Mutex<()>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn registration(&self) -> MutexGuard<'_, ()> {
        self.registration
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_registered_for(&self, event_type: &str, key: HandlerKey) -> bool {
        self.handlers
            .get(event_type)
            .is_some_and(|list| list.iter().any(|h| handler_key(h) == key))
    }

    fn add_catch_all(
        set: &DashMap<HandlerKey, Arc<dyn EventHandler>>,
        registry: &'static str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<()> {
        let key = handler_key(&handler);
        if set.contains_key(&key) {
            return Err(DomainError::already_registered(
                registry,
                handler.handler_name(),
            ));
        }
        tracing::debug!(handler = handler.handler_name(), registry, "handler registered");
        set.insert(key, handler);
        Ok(())
    }

    /// 某事件类型当前会投递到的处理器数量（含兜底处理器）
    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers.get(event_type).map_or(0, |l| l.len())
            + self.local_handlers.len()
            + self.global_handlers.len()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    #[tracing::instrument(level = "debug", skip(self, event), fields(event_type = event.event_type(), version = ?event.version()))]
    async fn publish_event(&self, event: &EventMessage) -> Result<()> {
        // 先复制出处理器列表，释放分片锁后再执行处理器
        let mut targets: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .get(event.event_type())
            .map(|list| list.clone())
            .unwrap_or_default();
        targets.extend(self.local_handlers.iter().map(|h| h.value().clone()));
        targets.extend(self.global_handlers.iter().map(|h| h.value().clone()));

        tracing::debug!(handlers = targets.len(), "publishing event");
        for handler in targets {
            handler.handle(event).await?;
        }
        Ok(())
    }

    fn add_handler(&self, handler: Arc<dyn EventHandler>, event_types: &[&str]) -> Result<()> {
        let _guard = self.registration();
        let key = handler_key(&handler);

        for (i, event_type) in event_types.iter().enumerate() {
            if event_types[..i].contains(event_type) || self.is_registered_for(event_type, key) {
                return Err(DomainError::already_registered("event bus", *event_type));
            }
        }

        for event_type in event_types {
            self.handlers
                .entry(event_type.to_string())
                .or_default()
                .push(handler.clone());
        }
        tracing::debug!(
            handler = handler.handler_name(),
            ?event_types,
            "handler registered"
        );
        Ok(())
    }

    fn add_local_handler(&self, handler: Arc<dyn EventHandler>) -> Result<()> {
        let _guard = self.registration();
        Self::add_catch_all(&self.local_handlers, "event bus local handlers", handler)
    }

    fn add_global_handler(&self, handler: Arc<dyn EventHandler>) -> Result<()> {
        let _guard = self.registration();
        Self::add_catch_all(&self.global_handlers, "event bus global handlers", handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Event;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct ItemCreated {
        name: String,
    }

    impl Event for ItemCreated {
        const TYPE: &'static str = "ItemCreated";
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct ItemRenamed {
        name: String,
    }

    impl Event for ItemRenamed {
        const TYPE: &'static str = "ItemRenamed";
    }

    #[derive(Default)]
    struct Counter {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl EventHandler for Counter {
        fn handler_name(&self) -> &str {
            "counter"
        }

        async fn handle(&self, _event: &EventMessage) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::EventHandler {
                    handler: "counter".into(),
                    reason: "boom".into(),
                });
            }
            Ok(())
        }
    }

    impl Counter {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn created() -> EventMessage {
        EventMessage::new("item-1", ItemCreated { name: "A".into() })
    }

    fn renamed() -> EventMessage {
        EventMessage::new("item-1", ItemRenamed { name: "B".into() })
    }

    #[tokio::test]
    async fn typed_handler_only_sees_its_type() {
        let bus = InMemoryEventBus::new();
        let handler = Arc::new(Counter::default());
        bus.add_handler(handler.clone(), &[ItemCreated::TYPE])
            .unwrap();

        bus.publish_event(&renamed()).await.unwrap();
        assert_eq!(handler.calls(), 0);

        bus.publish_event(&created()).await.unwrap();
        assert_eq!(handler.calls(), 1);
    }

    #[tokio::test]
    async fn multiple_handlers_per_type_and_catch_alls() {
        let bus = InMemoryEventBus::new();
        let a = Arc::new(Counter::default());
        let b = Arc::new(Counter::default());
        let local = Arc::new(Counter::default());
        let global = Arc::new(Counter::default());

        bus.add_handler(a.clone(), &[ItemCreated::TYPE, ItemRenamed::TYPE])
            .unwrap();
        bus.add_handler(b.clone(), &[ItemCreated::TYPE]).unwrap();
        bus.add_local_handler(local.clone()).unwrap();
        bus.add_global_handler(global.clone()).unwrap();
        assert_eq!(bus.handler_count(ItemCreated::TYPE), 4);

        bus.publish_events(&[created(), renamed()]).await.unwrap();
        assert_eq!(a.calls(), 2);
        assert_eq!(b.calls(), 1);
        assert_eq!(local.calls(), 2);
        assert_eq!(global.calls(), 2);
    }

    #[tokio::test]
    async fn same_handler_typed_and_global_is_delivered_twice() {
        let bus = InMemoryEventBus::new();
        let handler = Arc::new(Counter::default());
        bus.add_handler(handler.clone(), &[ItemCreated::TYPE])
            .unwrap();
        bus.add_global_handler(handler.clone()).unwrap();

        bus.publish_event(&created()).await.unwrap();
        assert_eq!(handler.calls(), 2);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected_and_all_or_nothing() {
        let bus = InMemoryEventBus::new();
        let handler = Arc::new(Counter::default());
        bus.add_handler(handler.clone(), &[ItemCreated::TYPE])
            .unwrap();

        let err = bus
            .add_handler(handler.clone(), &[ItemRenamed::TYPE, ItemCreated::TYPE])
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
        assert!(err.to_string().contains("ItemCreated"));

        bus.publish_event(&renamed()).await.unwrap();
        bus.publish_event(&created()).await.unwrap();
        assert_eq!(handler.calls(), 1);

        assert!(bus.add_global_handler(handler.clone()).is_ok());
        assert!(bus.add_global_handler(handler.clone()).is_err());
        assert!(bus.add_local_handler(handler.clone()).is_ok());
        assert!(bus.add_local_handler(handler).is_err());
    }

    #[tokio::test]
    async fn failing_handler_error_reaches_publisher() {
        let bus = InMemoryEventBus::new();
        let failing = Arc::new(Counter {
            fail: true,
            ..Default::default()
        });
        bus.add_handler(failing.clone(), &[ItemCreated::TYPE])
            .unwrap();

        let err = bus.publish_event(&created()).await.unwrap_err();
        assert!(matches!(err, DomainError::EventHandler { .. }));
        assert_eq!(failing.calls(), 1);
    }
}
