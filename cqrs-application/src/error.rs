use cqrs_domain::error::DomainError;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("the dispatcher does not have a handler for commands of type: {0}")]
    HandlerNotFound(String),

    #[error("dispatcher: already registered for type \"{command}\"")]
    AlreadyRegisteredCommand { command: String },

    #[error("no aggregate type mapped for command type: {0}")]
    NoAggregateMapping(String),
}

impl AppError {
    /// 乐观并发冲突：调用方可重新加载后重试
    pub fn is_concurrency(&self) -> bool {
        matches!(self, AppError::Domain(DomainError::Concurrency { .. }))
    }
}
