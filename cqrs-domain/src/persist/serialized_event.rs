//! 事件持久化模型（SerializedEvent）
//!
//! 事件在存储层的标准形态：类型标签 + JSON 载荷 + 头部，附带在流中的位置。
//!
use crate::{
    error::DomainResult,
    message::{EventMessage, Headers},
};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
pub struct SerializedEvent {
    /// 事件唯一标识符
    event_id: String,
    /// 事件类型标签，读取时交给 `EventFactory` 还原具体类型
    event_type: String,
    /// 所属流名称
    stream: String,
    /// 在流中的位置，从 0 开始
    position: usize,
    /// 追加时间
    occurred_at: DateTime<Utc>,
    /// 事件负载
    payload: Value,
    /// 头部（元数据）
    #[builder(default)]
    headers: Headers,
}

impl SerializedEvent {
    /// 将待追加的事件信封序列化为位于 `position` 的记录；
    /// `common` 中的头部作为默认值，事件自身的同名头部优先。
    pub fn from_message(
        stream: &str,
        position: usize,
        message: &EventMessage,
        common: &Headers,
    ) -> DomainResult<Self> {
        let mut headers = common.clone();
        headers.extend(
            message
                .headers()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        Ok(SerializedEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            event_type: message.event_type().to_string(),
            stream: stream.to_string(),
            position,
            occurred_at: Utc::now(),
            payload: message.payload().to_value()?,
            headers,
        })
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// 事件序号（位置 + 1），即应用该事件后聚合的版本
    pub fn version(&self) -> usize {
        self.position + 1
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}
