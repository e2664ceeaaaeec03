use crate::aggregate::{Aggregate, AggregateRoot};
use crate::error::{DomainError, DomainResult};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

pub type AggregateConstructor = Arc<dyn Fn(&str) -> Box<dyn AggregateRoot> + Send + Sync>;

/// 按类型标签创建空聚合（已设置聚合 ID）
pub trait AggregateFactory: Send + Sync {
    fn get_aggregate(&self, aggregate_type: &str, aggregate_id: &str)
    -> Option<Box<dyn AggregateRoot>>;
}

/// 基于委托函数的聚合工厂
#[derive(Default)]
pub struct DelegateAggregateFactory {
    delegates: DashMap<String, AggregateConstructor>,
}

impl DelegateAggregateFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为 `aggregate_type` 注册构造函数，重复注册返回 `AlreadyRegistered`
    pub fn register_delegate<F>(&self, aggregate_type: &str, delegate: F) -> DomainResult<()>
    where
        F: Fn(&str) -> Box<dyn AggregateRoot> + Send + Sync + 'static,
    {
        match self.delegates.entry(aggregate_type.to_string()) {
            Entry::Occupied(_) => Err(DomainError::already_registered(
                "aggregate factory",
                aggregate_type,
            )),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(delegate));
                tracing::debug!(aggregate_type, "aggregate factory delegate registered");
                Ok(())
            }
        }
    }

    /// 以 `A::TYPE` 为标签、`A::new` 为构造函数注册
    pub fn register<A>(&self) -> DomainResult<()>
    where
        A: Aggregate,
    {
        self.register_delegate(A::TYPE, |id| {
            Box::new(A::new(id.to_string())) as Box<dyn AggregateRoot>
        })
    }
}

impl AggregateFactory for DelegateAggregateFactory {
    fn get_aggregate(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Option<Box<dyn AggregateRoot>> {
        let delegate = self.delegates.get(aggregate_type).map(|d| d.clone())?;
        Some(delegate(aggregate_id))
    }
}
