use crate::{command_handler::CommandHandler, error::AppError};
use async_trait::async_trait;
use cqrs_domain::aggregate::Aggregate;
use cqrs_domain::message::CommandMessage;
use cqrs_domain::persist::DomainRepository;
use dashmap::DashMap;
use std::sync::Mutex;

/// 聚合命令处理器
///
/// 按命令类型找到目标聚合类型，`load` → `AggregateRoot::handle` → `save`。
/// 保存不加应用层锁，同一聚合的并发命令在事件存储的乐观并发检查处竞争。
pub struct AggregateCommandHandler<R> {
    repository: R,
    aggregates: DashMap<String, String>,
    registration: Mutex<()>,
}

impl<R> AggregateCommandHandler<R>
where
    R: DomainRepository,
{
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            aggregates: DashMap::new(),
            registration: Mutex::new(()),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// 将 `command_types` 映射到 `aggregate_type`；任一命令类型已映射时整体失败
    pub fn register_aggregate(
        &self,
        aggregate_type: &str,
        command_types: &[&str],
    ) -> Result<(), AppError> {
        let _guard = self
            .registration
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        for (i, command_type) in command_types.iter().enumerate() {
            if command_types[..i].contains(command_type)
                || self.aggregates.contains_key(*command_type)
            {
                return Err(AppError::AlreadyRegisteredCommand {
                    command: command_type.to_string(),
                });
            }
        }

        for command_type in command_types {
            self.aggregates
                .insert(command_type.to_string(), aggregate_type.to_string());
        }
        tracing::debug!(aggregate_type, ?command_types, "aggregate commands mapped");
        Ok(())
    }

    pub fn register<A>(&self, command_types: &[&str]) -> Result<(), AppError>
    where
        A: Aggregate,
    {
        self.register_aggregate(A::TYPE, command_types)
    }
}

#[async_trait]
impl<R> CommandHandler for AggregateCommandHandler<R>
where
    R: DomainRepository,
{
    #[tracing::instrument(
        level = "debug",
        skip(self, command),
        fields(command_type = command.command_type(), aggregate_id = command.aggregate_id())
    )]
    async fn handle(&self, command: &CommandMessage) -> Result<(), AppError> {
        let aggregate_type = self
            .aggregates
            .get(command.command_type())
            .map(|t| t.clone())
            .ok_or_else(|| AppError::NoAggregateMapping(command.command_type().to_string()))?;

        let mut aggregate = self
            .repository
            .load(&aggregate_type, command.aggregate_id())
            .await?;

        aggregate.handle(command)?;

        self.repository.save(aggregate.as_mut(), None).await?;
        Ok(())
    }
}
