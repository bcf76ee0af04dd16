//! Project model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Project lifecycle status
///
/// `Deleting` is set when a deletion task is created so the UI can
/// grey the project out while the task works through its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Initializing,
    Active,
    Archived,
    Deleting,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Initializing
    }
}

/// A bug-bounty engagement against a single target domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// Apex domain subdomain enumeration runs against
    pub target_domain: String,
    pub status: ProjectStatus,
    /// Background task currently enumerating subdomains, if any
    pub enumeration_task_id: Option<Uuid>,
    /// Background task currently deleting this project, if any
    pub deletion_task_id: Option<Uuid>,
    pub subdomains_count: usize,
    pub vulnerabilities_found: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project in Initializing status
    pub fn new(name: impl Into<String>, target_domain: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target_domain: target_domain.into(),
            status: ProjectStatus::default(),
            enumeration_task_id: None,
            deletion_task_id: None,
            subdomains_count: 0,
            vulnerabilities_found: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the status
    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the enumeration task id
    pub fn with_enumeration_task(mut self, task_id: Uuid) -> Self {
        self.enumeration_task_id = Some(task_id);
        self
    }
}
