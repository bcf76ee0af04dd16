//! Deletion slice executor
//!
//! Cascading project deletion, one bounded batch of child records per
//! invocation. The total child count is snapshotted on the first slice
//! and used as the fixed denominator for progress; the final slice
//! removes the project record itself.

use futures::future::join_all;
use tracing::warn;

use rb_core::project::ProjectStore;
use rb_core::subdomain::SubdomainStore;
use rb_core::task::{Task, TaskData, TaskResult};
use rb_core::vulnerability::VulnerabilityStore;

use crate::{EngineError, Result};

/// Result of one deletion slice
#[derive(Debug, Clone, Copy)]
pub struct DeletionSlice {
    /// Child deletions attempted so far, across all slices
    pub deleted_count: usize,
    /// Child count snapshotted on the first slice
    pub total_count: usize,
    /// True once the project record itself has been removed
    pub project_deleted: bool,
}

impl DeletionSlice {
    /// Progress percentage for this slice
    ///
    /// Capped at 95 while children remain; the final project-delete
    /// step consumes the reserved headroom. Also capped if concurrent
    /// edits push the live count past the snapshot.
    pub fn progress(&self) -> u8 {
        if self.project_deleted {
            return 100;
        }
        if self.total_count == 0 {
            return 95;
        }
        let pct = (self.deleted_count as f64 / self.total_count as f64 * 100.0).round() as u8;
        pct.min(95)
    }
}

/// Executes deletion slices against the document stores
pub struct DeletionExecutor {
    projects: ProjectStore,
    subdomains: SubdomainStore,
    vulnerabilities: VulnerabilityStore,
    batch_size: usize,
}

impl DeletionExecutor {
    pub fn new(
        projects: ProjectStore,
        subdomains: SubdomainStore,
        vulnerabilities: VulnerabilityStore,
        batch_size: usize,
    ) -> Self {
        Self {
            projects,
            subdomains,
            vulnerabilities,
            batch_size,
        }
    }

    /// Run one slice of the given deletion task
    ///
    /// A missing project is task-fatal. A single child record failing
    /// to delete is logged and skipped; the count still advances by
    /// the records attempted, and the batch offset skips survivors on
    /// the next slice so a stuck record cannot wedge the task.
    pub async fn run_slice(&self, task: &Task) -> Result<DeletionSlice> {
        let TaskData::ProjectDeletion { project_id } = &task.data else {
            return Err(EngineError::KindMismatch {
                task_id: task.id,
                expected: "project_deletion",
            });
        };
        let project_id = *project_id;

        if self.projects.get(project_id).await.is_none() {
            return Err(EngineError::ProjectNotFound);
        }

        let live_count = self.subdomains.count_by_project(project_id).await;
        let (mut deleted_count, total_count) = match &task.result {
            Some(TaskResult::Deletion {
                deleted_count,
                total_count,
                ..
            }) => (*deleted_count, *total_count),
            // First slice: snapshot the denominator once
            _ => (0, live_count),
        };

        // Records attempted earlier but still present (failed deletes)
        // sit at the front of the stable listing; skip past them.
        let offset = (deleted_count + live_count).saturating_sub(total_count);
        let batch = self
            .subdomains
            .list_batch(project_id, offset, self.batch_size)
            .await;

        if batch.is_empty() {
            // No children left to attempt: cascade to the project itself
            self.vulnerabilities.delete_by_project(project_id).await?;
            self.projects.delete(project_id).await?;
            return Ok(DeletionSlice {
                deleted_count,
                total_count,
                project_deleted: true,
            });
        }

        let results = join_all(batch.iter().map(|s| self.subdomains.delete(s.id))).await;
        for (subdomain, result) in batch.iter().zip(results) {
            if let Err(e) = result {
                warn!(
                    subdomain = %subdomain.hostname,
                    error = %e,
                    "failed to delete subdomain, skipping"
                );
            }
        }

        // Counts attempted deletions, not confirmed ones
        deleted_count += batch.len();

        Ok(DeletionSlice {
            deleted_count,
            total_count,
            project_deleted: false,
        })
    }
}
