//! Task model definitions
//!
//! A task is the unit of resumable background work. It is processed in
//! bounded slices across repeated invocations, so everything an
//! invocation needs to pick up where the last one stopped lives on the
//! record itself: immutable job parameters, a monotonic progress
//! percentage and the accumulated partial result.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of background job a task represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    SubdomainEnumeration,
    ProjectDeletion,
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl TaskStatus {
    /// Terminal tasks are never mutated by the engine again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Immutable job parameters, fixed at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskData {
    SubdomainEnumeration {
        project_id: Uuid,
        target_domain: String,
    },
    ProjectDeletion {
        project_id: Uuid,
    },
}

impl TaskData {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::SubdomainEnumeration { .. } => TaskKind::SubdomainEnumeration,
            Self::ProjectDeletion { .. } => TaskKind::ProjectDeletion,
        }
    }

    pub fn project_id(&self) -> Uuid {
        match self {
            Self::SubdomainEnumeration { project_id, .. } => *project_id,
            Self::ProjectDeletion { project_id } => *project_id,
        }
    }
}

/// Accumulated partial (or final) output of a task
///
/// Results grow monotonically across slices: the hostname set only
/// gains entries and the deleted count only increases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskResult {
    Enumeration {
        subdomains: BTreeSet<String>,
        completed_sources: usize,
    },
    Deletion {
        deleted_count: usize,
        total_count: usize,
        project_deleted: bool,
    },
}

/// A persisted background task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub data: TaskData,
    pub status: TaskStatus,
    /// Percentage 0-100, non-decreasing while processing
    pub progress: u8,
    pub result: Option<TaskResult>,
    /// Present only when status is Failed
    pub error: Option<String>,
    /// Lease flag: set while a slice invocation holds the task
    #[serde(default)]
    pub leased: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new pending task with the given job parameters
    pub fn new(data: TaskData) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            data,
            status: TaskStatus::Pending,
            progress: 0,
            result: None,
            error: None,
            leased: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.data.kind()
    }

    /// Whether a slice invocation may advance this task
    pub fn is_runnable(&self) -> bool {
        matches!(self.status, TaskStatus::Pending | TaskStatus::Processing)
    }
}

/// Read-only view of a task served to polling clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub id: Uuid,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub progress: u8,
    pub result: Option<TaskResult>,
    pub error: Option<String>,
}

impl From<&Task> for TaskSnapshot {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            kind: task.kind(),
            status: task.status,
            progress: task.progress,
            result: task.result.clone(),
            error: task.error.clone(),
        }
    }
}
