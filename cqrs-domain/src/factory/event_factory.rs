use crate::error::{DomainError, DomainResult};
use crate::message::{Event, EventPayload};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;
use std::sync::Arc;

pub type EventDecoder =
    Arc<dyn Fn(Value) -> Result<Arc<dyn EventPayload>, serde_json::Error> + Send + Sync>;

/// 按事件类型标签将持久化载荷还原为具体事件
pub trait EventFactory: Send + Sync {
    /// 未注册的类型返回 `None`；已注册但载荷不符时返回反序列化错误
    fn get_event(
        &self,
        event_type: &str,
        payload: Value,
    ) -> Option<Result<Arc<dyn EventPayload>, serde_json::Error>>;
}

/// 基于委托函数的事件工厂
#[derive(Default)]
pub struct DelegateEventFactory {
    decoders: DashMap<String, EventDecoder>,
}

impl DelegateEventFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_delegate<F>(&self, event_type: &str, decoder: F) -> DomainResult<()>
    where
        F: Fn(Value) -> Result<Arc<dyn EventPayload>, serde_json::Error> + Send + Sync + 'static,
    {
        match self.decoders.entry(event_type.to_string()) {
            Entry::Occupied(_) => Err(DomainError::already_registered(
                "event factory",
                event_type,
            )),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(decoder));
                tracing::debug!(event_type, "event factory delegate registered");
                Ok(())
            }
        }
    }

    /// 以 `E::TYPE` 为标签注册 serde 反序列化
    pub fn register<E>(&self) -> DomainResult<()>
    where
        E: Event,
    {
        self.register_delegate(E::TYPE, |value| {
            let event: E = serde_json::from_value(value)?;
            Ok(Arc::new(event) as Arc<dyn EventPayload>)
        })
    }
}

impl EventFactory for DelegateEventFactory {
    fn get_event(
        &self,
        event_type: &str,
        payload: Value,
    ) -> Option<Result<Arc<dyn EventPayload>, serde_json::Error>> {
        let decoder = self.decoders.get(event_type).map(|d| d.clone())?;
        Some(decoder(payload))
    }
}
