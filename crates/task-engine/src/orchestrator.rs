//! Task orchestrator
//!
//! The state machine that owns a task's lifecycle. Each call to
//! [`TaskOrchestrator::run_slice`] claims the task's lease, dispatches
//! one slice to the matching executor, persists the new progress and
//! result, applies the terminal transition if the job finished, and
//! releases the lease. Errors outside an executor's skip-and-continue
//! policy are converted to a Failed transition here, never surfaced to
//! the trigger as an unhandled failure.

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use rb_core::project::{ProjectStatus, ProjectStore};
use rb_core::subdomain::{DiscoveryMethod, SubdomainStore};
use rb_core::task::{
    ClaimOutcome, Task, TaskKind, TaskRepository, TaskResult, TaskSnapshot, TaskStatus,
};
use rb_core::vulnerability::VulnerabilityStore;

use crate::config::EngineConfig;
use crate::deletion::DeletionExecutor;
use crate::enumerate::EnumerationExecutor;
use crate::source::SourceRegistry;
use crate::{EngineError, Result};

/// Drives background tasks one slice at a time
pub struct TaskOrchestrator {
    tasks: Arc<dyn TaskRepository>,
    projects: ProjectStore,
    subdomains: SubdomainStore,
    enumeration: EnumerationExecutor,
    deletion: DeletionExecutor,
}

impl TaskOrchestrator {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        projects: ProjectStore,
        subdomains: SubdomainStore,
        vulnerabilities: VulnerabilityStore,
        registry: Arc<SourceRegistry>,
        config: EngineConfig,
    ) -> Self {
        let enumeration = EnumerationExecutor::new(registry, config.slice_size);
        let deletion = DeletionExecutor::new(
            projects.clone(),
            subdomains.clone(),
            vulnerabilities,
            config.batch_size,
        );
        Self {
            tasks,
            projects,
            subdomains,
            enumeration,
            deletion,
        }
    }

    /// Run one slice of the given task
    ///
    /// Safe to call repeatedly: a terminal task returns its snapshot
    /// unchanged, an in-flight task reports `TaskBusy`, and everything
    /// else advances by exactly one slice.
    pub async fn run_slice(&self, task_id: Uuid) -> Result<TaskSnapshot> {
        let task = match self.tasks.try_claim(task_id).await {
            Ok(ClaimOutcome::Claimed(task)) => task,
            Ok(ClaimOutcome::Terminal(task)) => return Ok(TaskSnapshot::from(&task)),
            Ok(ClaimOutcome::Busy) => return Err(EngineError::TaskBusy { task_id }),
            Err(rb_core::Error::TaskNotFound(_)) => {
                return Err(EngineError::TaskNotFound { task_id })
            }
            Err(e) => return Err(e.into()),
        };

        let outcome = self.advance(&task).await;

        // The lease is released on every path, including failures
        let snapshot = match outcome {
            Ok(updated) => Ok(TaskSnapshot::from(&updated)),
            Err(e) => self.mark_failed(task, e).await.map(|t| TaskSnapshot::from(&t)),
        };
        self.tasks.release(task_id).await?;
        snapshot
    }

    /// Dispatch one slice to the executor for the task's kind
    async fn advance(&self, task: &Task) -> Result<Task> {
        match task.kind() {
            TaskKind::SubdomainEnumeration => self.advance_enumeration(task).await,
            TaskKind::ProjectDeletion => self.advance_deletion(task).await,
        }
    }

    async fn advance_enumeration(&self, task: &Task) -> Result<Task> {
        let project_id = task.data.project_id();
        if self.projects.get(project_id).await.is_none() {
            return Err(EngineError::ProjectNotFound);
        }

        let slice = self.enumeration.run_slice(task).await?;
        let mut updated = task.clone();
        updated.progress = updated
            .progress
            .max(self.enumeration.progress_for(slice.completed_sources));
        updated.result = Some(TaskResult::Enumeration {
            subdomains: slice.subdomains.clone(),
            completed_sources: slice.completed_sources,
        });

        if self.enumeration.is_complete(slice.completed_sources) {
            // Materialize the final set; a persistence failure here is
            // task-fatal and handled by the caller
            for hostname in &slice.subdomains {
                self.subdomains
                    .upsert(project_id, hostname, DiscoveryMethod::AutoEnumeration)
                    .await?;
            }

            let mut project = self
                .projects
                .get(project_id)
                .await
                .ok_or(EngineError::ProjectNotFound)?;
            project.status = ProjectStatus::Active;
            project.subdomains_count = slice.subdomains.len();
            self.projects.update(project).await?;

            updated.status = TaskStatus::Completed;
            updated.progress = 100;
            info!(
                task_id = %task.id,
                subdomains = slice.subdomains.len(),
                "enumeration completed"
            );
        }

        Ok(self.tasks.update(updated).await?)
    }

    async fn advance_deletion(&self, task: &Task) -> Result<Task> {
        let slice = self.deletion.run_slice(task).await?;
        let mut updated = task.clone();
        updated.result = Some(TaskResult::Deletion {
            deleted_count: slice.deleted_count,
            total_count: slice.total_count,
            project_deleted: slice.project_deleted,
        });
        updated.progress = updated.progress.max(slice.progress());

        if slice.project_deleted {
            updated.status = TaskStatus::Completed;
            info!(task_id = %task.id, deleted = slice.deleted_count, "project deletion completed");
        }

        Ok(self.tasks.update(updated).await?)
    }

    /// Convert a slice error into a Failed transition
    async fn mark_failed(&self, mut task: Task, cause: EngineError) -> Result<Task> {
        error!(task_id = %task.id, error = %cause, "task failed");
        task.status = TaskStatus::Failed;
        task.error = Some(cause.to_string());
        Ok(self.tasks.update(task).await?)
    }
}
