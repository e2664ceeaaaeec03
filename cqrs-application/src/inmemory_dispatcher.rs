use crate::{command_handler::CommandHandler, dispatcher::Dispatcher, error::AppError};
use async_trait::async_trait;
use cqrs_domain::message::CommandMessage;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

/// 基于内存的 Dispatcher 实现
/// - 以命令类型标签为键注册处理器
/// - 多类型注册要么全部成功，要么全部不生效
#[derive(Default)]
pub struct InMemoryDispatcher {
    handlers: DashMap<String, Arc<dyn CommandHandler>>,
    registration: Mutex<()>,
}

impl InMemoryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_handler(&self, command_type: &str) -> bool {
        self.handlers.contains_key(command_type)
    }
}

#[async_trait]
impl Dispatcher for InMemoryDispatcher {
    #[tracing::instrument(
        level = "debug",
        skip(self, command),
        fields(command_type = command.command_type(), aggregate_id = command.aggregate_id())
    )]
    async fn dispatch(&self, command: &CommandMessage) -> Result<(), AppError> {
        let Some(handler) = self
            .handlers
            .get(command.command_type())
            .map(|h| h.clone())
        else {
            return Err(AppError::HandlerNotFound(
                command.command_type().to_string(),
            ));
        };

        handler.handle(command).await
    }

    fn register_handler(
        &self,
        handler: Arc<dyn CommandHandler>,
        command_types: &[&str],
    ) -> Result<(), AppError> {
        let _guard = self
            .registration
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        for (i, command_type) in command_types.iter().enumerate() {
            if command_types[..i].contains(command_type)
                || self.handlers.contains_key(*command_type)
            {
                return Err(AppError::AlreadyRegisteredCommand {
                    command: command_type.to_string(),
                });
            }
        }

        for command_type in command_types {
            self.handlers
                .insert(command_type.to_string(), handler.clone());
        }
        tracing::debug!(?command_types, "command handler registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqrs_domain::error::DomainError;
    use cqrs_domain::message::Command;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct CreateItem;

    impl Command for CreateItem {
        const NAME: &'static str = "CreateItem";
    }

    #[derive(Debug)]
    struct RenameItem;

    impl Command for RenameItem {
        const NAME: &'static str = "RenameItem";
    }

    #[derive(Default)]
    struct Recorder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CommandHandler for Recorder {
        async fn handle(&self, command: &CommandMessage) -> Result<(), AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if command.command_type() == RenameItem::NAME {
                return Err(DomainError::command_execution(command, "name must not be empty").into());
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn routes_by_command_type() {
        let dispatcher = InMemoryDispatcher::new();
        let handler = Arc::new(Recorder::default());
        dispatcher
            .register_handler(handler.clone(), &[CreateItem::NAME, RenameItem::NAME])
            .unwrap();

        dispatcher
            .dispatch(&CommandMessage::new("item-1", CreateItem))
            .await
            .unwrap();
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);

        let err = dispatcher
            .dispatch(&CommandMessage::new("item-1", RenameItem))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::CommandExecution { .. })
        ));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_handler_names_the_type() {
        let dispatcher = InMemoryDispatcher::new();
        let err = dispatcher
            .dispatch(&CommandMessage::new("item-1", CreateItem))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::HandlerNotFound(ref t) if t == "CreateItem"));
        assert!(err.to_string().contains("CreateItem"));
    }

    #[test]
    fn second_registration_for_same_type_fails() {
        let dispatcher = InMemoryDispatcher::new();
        let h1 = Arc::new(Recorder::default());
        let h2 = Arc::new(Recorder::default());

        dispatcher
            .register_handler(h1, &[CreateItem::NAME])
            .unwrap();
        let err = dispatcher
            .register_handler(h2, &[RenameItem::NAME, CreateItem::NAME])
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("already registered"));
        assert!(msg.contains("CreateItem"));
        assert!(!dispatcher.has_handler(RenameItem::NAME));
    }
}
