//! Error types for the task engine

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while advancing a task
#[derive(Debug, Error)]
pub enum EngineError {
    /// No task record exists for the given id
    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: Uuid },

    /// Another invocation currently holds the task's lease
    #[error("Task {task_id} is already being processed")]
    TaskBusy { task_id: Uuid },

    /// The project a task refers to does not exist
    ///
    /// The message is recorded verbatim on failed tasks, so keep it
    /// stable.
    #[error("Project not found")]
    ProjectNotFound,

    /// A task was dispatched to an executor for a different job kind
    #[error("Task {task_id} is not a {expected} task")]
    KindMismatch { task_id: Uuid, expected: &'static str },

    /// Storage error from the core stores
    #[error("Storage error: {0}")]
    Core(#[from] rb_core::Error),

    /// HTTP error from a data source
    #[error("Source request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Data source returned something unusable
    #[error("Source error: {0}")]
    Source(String),
}
