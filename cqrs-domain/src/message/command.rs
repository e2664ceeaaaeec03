use super::headers::Headers;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 命令（Command）
///
/// 表达“意图”的写操作请求，可能被拒绝。
/// `NAME` 为命令的稳定名称，用于路由与日志，避免依赖 `type_name::<T>()`。
pub trait Command: fmt::Debug + Send + Sync + 'static {
    const NAME: &'static str;
}

/// 类型擦除后的命令载荷
pub trait CommandPayload: fmt::Debug + Send + Sync + 'static {
    fn command_type(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

impl<C> CommandPayload for C
where
    C: Command,
{
    fn command_type(&self) -> &'static str {
        C::NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// 命令信封
#[derive(Debug, Clone)]
pub struct CommandMessage {
    aggregate_id: String,
    payload: Arc<dyn CommandPayload>,
    headers: Headers,
}

impl CommandMessage {
    pub fn new<C>(aggregate_id: impl Into<String>, command: C) -> Self
    where
        C: Command,
    {
        Self {
            aggregate_id: aggregate_id.into(),
            payload: Arc::new(command),
            headers: Headers::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_header(key, value);
        self
    }

    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.headers.insert(key.into(), value.into());
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn command_type(&self) -> &'static str {
        self.payload.command_type()
    }

    pub fn payload(&self) -> &dyn CommandPayload {
        self.payload.as_ref()
    }

    pub fn downcast_ref<C>(&self) -> Option<&C>
    where
        C: Command,
    {
        self.payload.as_any().downcast_ref::<C>()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&Value> {
        self.headers.get(key)
    }
}
