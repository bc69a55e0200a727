use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the task core. None of them are fatal; the caller
/// displays them and the forest/timeline are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("parent task not found: {0}")]
    ParentNotFound(Uuid),

    #[error("task {0} is not a recurring template")]
    NotRecurring(Uuid),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }
}
