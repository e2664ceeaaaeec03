//! 流式传输事件存储（StreamingEventStore）
//!
//! 适配远程事件存储：
//! - 读取：传输层在后台任务中按顺序产出记录，经有界通道交给 `load` 消费，
//!   直到通道关闭或遇到终止性错误；
//! - 写入：带期望版本前置条件的单次原子追加；
//! - 传输层状态统一翻译为 `DomainError`。
//!
use crate::{
    error::{DomainError, DomainResult},
    message::{EventMessage, Headers},
    persist::{EventStore, SerializedEvent},
};
use async_trait::async_trait;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// 传输层返回的原始记录
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub event_id: String,
    pub event_type: String,
    pub payload: Value,
    /// 在流中的位置，从 0 开始
    pub position: usize,
    pub occurred_at: DateTime<Utc>,
    pub headers: Headers,
}

/// 传输层响应元数据
#[derive(Debug, Clone, Default)]
pub struct ResponseMeta {
    pub status: u16,
    pub headers: Headers,
}

/// 待追加的事件
#[derive(Debug, Clone)]
pub struct OutgoingEvent {
    pub event_id: String,
    pub event_type: String,
    pub payload: Value,
    pub headers: Headers,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("stream not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("wrong expected version: {0}")]
    Conflict(String),
    #[error("temporarily unavailable: {0}")]
    Unavailable(String),
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("unexpected status {code}: {message}")]
    Status { code: u16, message: String },
}

impl TransportError {
    /// 按 HTTP 风格的状态码归类
    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            401 | 403 => TransportError::Unauthorized,
            404 | 410 => TransportError::NotFound,
            409 | 412 => TransportError::Conflict(message),
            500..=599 => TransportError::Unavailable(message),
            _ => TransportError::Status { code, message },
        }
    }
}

pub type ReadItem = Result<(RawRecord, ResponseMeta), TransportError>;

/// 远程事件存储的传输层
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// 开始正向读取 `stream`，由实现方在后台任务中写入通道，读完后关闭发送端
    fn read_stream_forward(&self, stream: &str, capacity: usize) -> mpsc::Receiver<ReadItem>;

    /// 单次原子条件追加；`expected_version` 为 `None` 时不检查版本
    async fn append_to_stream(
        &self,
        stream: &str,
        expected_version: Option<usize>,
        events: Vec<OutgoingEvent>,
    ) -> Result<ResponseMeta, TransportError>;
}

#[derive(Debug, Clone)]
pub struct StreamingEventStoreConfig {
    /// 单条记录（或单次追加）的最长等待时间，`None` 表示不限
    pub read_timeout: Option<Duration>,
    pub channel_capacity: usize,
}

impl Default for StreamingEventStoreConfig {
    fn default() -> Self {
        Self {
            read_timeout: None,
            channel_capacity: 64,
        }
    }
}

#[derive(Builder)]
pub struct StreamingEventStore<T>
where
    T: StreamTransport,
{
    transport: T,
    #[builder(default)]
    config: StreamingEventStoreConfig,
    cancel_token: Option<CancellationToken>,
}

impl<T> StreamingEventStore<T>
where
    T: StreamTransport,
{
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 为传输层调用附加超时与取消
    async fn guarded<F>(&self, fut: F) -> DomainResult<F::Output>
    where
        F: Future,
    {
        let timed = async {
            match self.config.read_timeout {
                Some(limit) => tokio::time::timeout(limit, fut)
                    .await
                    .map_err(|_| DomainError::unavailable(format!("timed out after {limit:?}"))),
                None => Ok(fut.await),
            }
        };

        match &self.cancel_token {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(DomainError::unavailable("operation cancelled")),
                out = timed => out,
            },
            None => timed.await,
        }
    }
}

fn translate(stream: &str, expected_version: Option<usize>, err: TransportError) -> DomainError {
    match err {
        TransportError::NotFound => DomainError::StreamNotFound {
            stream: stream.to_string(),
        },
        TransportError::Unauthorized => DomainError::Unauthorized,
        TransportError::Unavailable(reason) => DomainError::unavailable(reason),
        TransportError::Network(source) => DomainError::unavailable(source.to_string()),
        TransportError::Conflict(reason) => match expected_version {
            Some(expected) => DomainError::VersionConflict {
                stream: stream.to_string(),
                expected,
                actual: None,
            },
            None => DomainError::unexpected(TransportError::Conflict(reason)),
        },
        other => DomainError::unexpected(other),
    }
}

#[async_trait]
impl<T> EventStore for StreamingEventStore<T>
where
    T: StreamTransport,
{
    #[tracing::instrument(level = "debug", skip(self, events, headers), fields(count = events.len()))]
    async fn save(
        &self,
        stream: &str,
        events: &[EventMessage],
        expected_version: Option<usize>,
        headers: &Headers,
    ) -> DomainResult<()> {
        if events.is_empty() {
            return Err(DomainError::NoEventsToAppend);
        }

        let outgoing = events
            .iter()
            .map(|e| -> DomainResult<OutgoingEvent> {
                let mut merged = headers.clone();
                merged.extend(e.headers().iter().map(|(k, v)| (k.clone(), v.clone())));
                Ok(OutgoingEvent {
                    event_id: uuid::Uuid::new_v4().to_string(),
                    event_type: e.event_type().to_string(),
                    payload: e.payload().to_value()?,
                    headers: merged,
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let meta = self
            .guarded(
                self.transport
                    .append_to_stream(stream, expected_version, outgoing),
            )
            .await?
            .map_err(|err| {
                tracing::warn!(error = %err, "append rejected by transport");
                translate(stream, expected_version, err)
            })?;

        tracing::debug!(status = meta.status, count = events.len(), "events appended");
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn load(&self, stream: &str) -> DomainResult<Vec<SerializedEvent>> {
        let mut rx = self
            .transport
            .read_stream_forward(stream, self.config.channel_capacity.max(1));
        let mut records = Vec::new();

        while let Some(item) = self.guarded(rx.recv()).await? {
            match item {
                Ok((raw, meta)) => {
                    // 响应头作为缺省值，记录自身的头优先
                    let mut headers = meta.headers;
                    headers.extend(raw.headers);
                    records.push(
                        SerializedEvent::builder()
                            .event_id(raw.event_id)
                            .event_type(raw.event_type)
                            .stream(stream.to_string())
                            .position(raw.position)
                            .occurred_at(raw.occurred_at)
                            .payload(raw.payload)
                            .headers(headers)
                            .build(),
                    )
                }
                Err(err) => {
                    tracing::warn!(error = %err, read = records.len(), "stream read failed");
                    return Err(translate(stream, None, err));
                }
            }
        }

        tracing::debug!(count = records.len(), "stream drained");
        Ok(records)
    }
}
