//! 流命名（StreamNamer）
//!
//! 将（聚合类型标签, 聚合 ID）映射为存储层的流名称。命名函数按聚合类型注册，
//! 没有全局兜底：请求未注册的类型返回装配错误。
//!
use crate::aggregate::Aggregate;
use crate::error::{DomainError, DomainResult};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

pub type StreamNameDelegate = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

pub trait StreamNamer: Send + Sync {
    fn stream_name(&self, aggregate_type: &str, aggregate_id: &str) -> DomainResult<String>;
}

/// 常用的 `"{AggregateType}-{id}"` 命名
pub fn default_stream_name(aggregate_type: &str, aggregate_id: &str) -> String {
    format!("{aggregate_type}-{aggregate_id}")
}

/// 按聚合类型保存命名委托的流命名器
#[derive(Default)]
pub struct DelegateStreamNamer {
    delegates: DashMap<String, StreamNameDelegate>,
    registration: Mutex<()>,
}

impl DelegateStreamNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为 `aggregate_types` 中的每个类型注册同一个命名委托。
    ///
    /// 任一类型已注册时整个调用失败，本次不写入任何类型。
    pub fn register_delegate<F>(&self, delegate: F, aggregate_types: &[&str]) -> DomainResult<()>
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        let _guard = self
            .registration
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        for (i, aggregate_type) in aggregate_types.iter().enumerate() {
            if aggregate_types[..i].contains(aggregate_type)
                || self.delegates.contains_key(*aggregate_type)
            {
                return Err(DomainError::already_registered("stream namer", *aggregate_type));
            }
        }

        let delegate: StreamNameDelegate = Arc::new(delegate);
        for aggregate_type in aggregate_types {
            self.delegates
                .insert(aggregate_type.to_string(), delegate.clone());
        }
        tracing::debug!(?aggregate_types, "stream name delegate registered");
        Ok(())
    }

    /// 以 `default_stream_name` 为 `A` 注册
    pub fn register<A>(&self) -> DomainResult<()>
    where
        A: Aggregate,
    {
        self.register_delegate(default_stream_name, &[A::TYPE])
    }
}

impl StreamNamer for DelegateStreamNamer {
    fn stream_name(&self, aggregate_type: &str, aggregate_id: &str) -> DomainResult<String> {
        let delegate = self
            .delegates
            .get(aggregate_type)
            .map(|d| d.clone())
            .ok_or_else(|| DomainError::MissingStreamNameDelegate {
                aggregate_type: aggregate_type.to_string(),
            })?;
        Ok(delegate(aggregate_type, aggregate_id))
    }
}
