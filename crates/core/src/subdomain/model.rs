//! Subdomain model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a subdomain entered the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    AutoEnumeration,
    Manual,
}

/// Scan status of a subdomain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubdomainStatus {
    Scanning,
    Completed,
    Error,
}

impl Default for SubdomainStatus {
    fn default() -> Self {
        Self::Scanning
    }
}

/// A discovered or manually added hostname under a project's target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subdomain {
    pub id: Uuid,
    pub hostname: String,
    pub project_id: Uuid,
    pub discovery_method: DiscoveryMethod,
    pub status: SubdomainStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subdomain {
    pub fn new(
        hostname: impl Into<String>,
        project_id: Uuid,
        discovery_method: DiscoveryMethod,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            hostname: hostname.into(),
            project_id,
            discovery_method,
            status: SubdomainStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }
}
