//! 领域层统一错误定义
//!
//! 覆盖乐观并发、传输/存储失败、命令执行失败与装配（配置）错误，
//! 各实现层统一转换为 `DomainError` 后沿调用链同步返回。
//!
use crate::message::CommandMessage;
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 乐观并发 ---
    /// 仓储层：保存时流的实际版本与期望版本不一致
    #[error(
        "concurrency error: aggregate_type={aggregate_type}, aggregate_id={aggregate_id}, expected_version={expected_version}, stream={stream_name}"
    )]
    Concurrency {
        aggregate_type: String,
        aggregate_id: String,
        expected_version: usize,
        stream_name: String,
    },
    /// 存储层：追加前置条件不满足，由仓储翻译为 `Concurrency`
    #[error("version conflict: stream={stream}, expected={expected}, actual={actual:?}")]
    VersionConflict {
        stream: String,
        expected: usize,
        actual: Option<usize>,
    },

    // --- 存储 / 传输 ---
    #[error("no events to append")]
    NoEventsToAppend,
    #[error("could not find events: stream={stream}")]
    NoEventsFound { stream: String },
    /// 传输层报告流从未存在（区别于“存在但没有事件”）
    #[error("stream not found: {stream}")]
    StreamNotFound { stream: String },
    #[error("aggregate not found: aggregate_type={aggregate_type}, aggregate_id={aggregate_id}")]
    AggregateNotFound {
        aggregate_type: String,
        aggregate_id: String,
    },
    #[error("not authorized")]
    Unauthorized,
    #[error("repository unavailable: {reason}")]
    RepositoryUnavailable { reason: String },
    #[error("an unexpected error occurred: {source}")]
    Unexpected {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    // --- 命令与事件处理 ---
    #[error("invalid operation: command={}, reason={reason}", command.command_type())]
    CommandExecution {
        command: CommandMessage,
        reason: String,
    },
    #[error("aggregate {aggregate_type} does not handle command {command_type}")]
    UnsupportedCommand {
        aggregate_type: String,
        command_type: String,
    },
    #[error("event handler error: handler={handler}, reason={reason}")]
    EventHandler { handler: String, reason: String },

    // --- 装配 / 配置 ---
    #[error("the common domain repository has no aggregate factory")]
    MissingAggregateFactory,
    #[error("the common domain repository has no stream namer")]
    MissingStreamNamer,
    #[error("the common domain repository has no event factory")]
    MissingEventFactory,
    #[error("no aggregate factory registered for aggregate type: {aggregate_type}")]
    UnknownAggregateType { aggregate_type: String },
    #[error("no event factory registered for event type: {event_type}")]
    UnknownEventType { event_type: String },
    #[error("there is no stream name delegate for aggregate of type \"{aggregate_type}\"")]
    MissingStreamNameDelegate { aggregate_type: String },
    #[error("{registry}: already registered for type \"{type_tag}\"")]
    AlreadyRegistered {
        registry: &'static str,
        type_tag: String,
    },

    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
}

impl DomainError {
    pub fn unexpected<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DomainError::Unexpected {
            source: Box::new(err),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        DomainError::RepositoryUnavailable {
            reason: reason.into(),
        }
    }

    pub fn command_execution(command: &CommandMessage, reason: impl Into<String>) -> Self {
        DomainError::CommandExecution {
            command: command.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn already_registered(registry: &'static str, type_tag: impl Into<String>) -> Self {
        DomainError::AlreadyRegistered {
            registry,
            type_tag: type_tag.into(),
        }
    }

    /// 是否属于装配错误（使用方式错误，不应重试）
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DomainError::MissingAggregateFactory
                | DomainError::MissingStreamNamer
                | DomainError::MissingEventFactory
                | DomainError::UnknownAggregateType { .. }
                | DomainError::UnknownEventType { .. }
                | DomainError::MissingStreamNameDelegate { .. }
                | DomainError::AlreadyRegistered { .. }
        )
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
