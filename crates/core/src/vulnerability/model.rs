//! Vulnerability model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VulnerabilityStatus {
    Open,
    Fixed,
    FalsePositive,
}

impl Default for VulnerabilityStatus {
    fn default() -> Self {
        Self::Open
    }
}

/// A finding recorded against one subdomain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: Uuid,
    pub subdomain_id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub status: VulnerabilityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vulnerability {
    pub fn new(
        subdomain_id: Uuid,
        project_id: Uuid,
        title: impl Into<String>,
        severity: Severity,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            subdomain_id,
            project_id,
            title: title.into(),
            description: None,
            severity,
            status: VulnerabilityStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_vulnerability() {
        let vuln = Vulnerability::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Reflected XSS on /search",
            Severity::High,
        )
        .with_description("q parameter echoed unescaped");

        assert_eq!(vuln.severity, Severity::High);
        assert_eq!(vuln.status, VulnerabilityStatus::Open);
        assert!(vuln.description.is_some());
    }
}
