use super::headers::Headers;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 领域事件载荷需要满足的能力边界
///
/// `TYPE` 是稳定的类型标签，用于事件工厂注册、总线路由与持久化记录，
/// 不随重构变化。可由 `#[event]` 宏生成。
pub trait Event:
    Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    const TYPE: &'static str;
}

/// 类型擦除后的事件载荷，`EventMessage` 通过它持有任意具体事件
pub trait EventPayload: fmt::Debug + Send + Sync + 'static {
    fn event_type(&self) -> &'static str;

    fn to_value(&self) -> Result<Value, serde_json::Error>;

    fn as_any(&self) -> &dyn Any;
}

impl<E> EventPayload for E
where
    E: Event,
{
    fn event_type(&self) -> &'static str {
        E::TYPE
    }

    fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// 事件信封
///
/// - `version`：事件在其流中的序号（从 1 开始），读取或成功追加后才有值；
/// - 载荷不可变，头部在首次持久化前允许追加。
#[derive(Debug, Clone)]
pub struct EventMessage {
    aggregate_id: String,
    payload: Arc<dyn EventPayload>,
    headers: Headers,
    version: Option<usize>,
}

impl EventMessage {
    pub fn new<E>(aggregate_id: impl Into<String>, event: E) -> Self
    where
        E: Event,
    {
        Self::from_payload(aggregate_id, Arc::new(event))
    }

    pub fn from_payload(aggregate_id: impl Into<String>, payload: Arc<dyn EventPayload>) -> Self {
        Self {
            aggregate_id: aggregate_id.into(),
            payload,
            headers: Headers::new(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: Option<usize>) -> Self {
        self.version = version;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_header(key, value);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.headers.insert(key.into(), value.into());
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }

    pub fn payload(&self) -> &dyn EventPayload {
        self.payload.as_ref()
    }

    /// 将载荷还原为具体事件类型，类型不符时返回 `None`
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Event,
    {
        self.payload.as_any().downcast_ref::<E>()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&Value> {
        self.headers.get(key)
    }

    pub fn version(&self) -> Option<usize> {
        self.version
    }
}
