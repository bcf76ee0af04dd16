//! Task repository trait
//!
//! Defines the interface for task record storage, including the
//! lease operations that give a slice invocation exclusive rights to
//! advance a task.

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{Task, TaskStatus};
use crate::Result;

/// Outcome of a claim attempt
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    /// The lease was acquired; the task is now Processing and leased
    Claimed(Task),
    /// The task is in a terminal status; nothing was changed
    Terminal(Task),
    /// Another invocation currently holds the lease
    Busy,
}

/// Repository interface for task records
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Create a new task record
    async fn create(&self, task: Task) -> Result<Task>;

    /// Get a task by ID
    async fn get(&self, id: Uuid) -> Result<Option<Task>>;

    /// Get all tasks
    async fn list(&self) -> Result<Vec<Task>>;

    /// Overwrite an existing task record, refreshing `updated_at`
    async fn update(&self, task: Task) -> Result<Task>;

    /// Delete a task record by ID
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Find tasks by status
    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>>;

    /// Conditionally claim a task for one slice invocation
    ///
    /// Atomic with respect to other claims on the same store: at most
    /// one caller observes `Claimed` until the lease is released. A
    /// pending task transitions to Processing as part of the claim.
    async fn try_claim(&self, id: Uuid) -> Result<ClaimOutcome>;

    /// Release the lease taken by `try_claim`
    async fn release(&self, id: Uuid) -> Result<()>;
}
