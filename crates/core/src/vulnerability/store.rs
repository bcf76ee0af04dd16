//! Vulnerability persistent store

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Error;
use crate::Result;

use super::model::Vulnerability;

/// Thread-safe vulnerability store with file persistence
#[derive(Clone)]
pub struct VulnerabilityStore {
    vulnerabilities: Arc<RwLock<HashMap<Uuid, Vulnerability>>>,
    file_path: PathBuf,
}

impl VulnerabilityStore {
    /// Create a new VulnerabilityStore with the given file path
    pub async fn new(file_path: PathBuf) -> Result<Self> {
        let vulnerabilities = if file_path.exists() {
            let content = tokio::fs::read_to_string(&file_path).await.map_err(|e| {
                Error::Storage(format!("Failed to read vulnerabilities file: {}", e))
            })?;
            serde_json::from_str(&content).map_err(|e| {
                Error::Storage(format!("Failed to parse vulnerabilities file: {}", e))
            })?
        } else {
            HashMap::new()
        };

        Ok(Self {
            vulnerabilities: Arc::new(RwLock::new(vulnerabilities)),
            file_path,
        })
    }

    /// Create a new vulnerability
    pub async fn create(&self, vulnerability: Vulnerability) -> Result<Vulnerability> {
        {
            let mut vulnerabilities = self.vulnerabilities.write().await;
            vulnerabilities.insert(vulnerability.id, vulnerability.clone());
        }
        self.persist().await?;
        Ok(vulnerability)
    }

    /// Get a vulnerability by ID
    pub async fn get(&self, id: Uuid) -> Option<Vulnerability> {
        let vulnerabilities = self.vulnerabilities.read().await;
        vulnerabilities.get(&id).cloned()
    }

    /// List vulnerabilities recorded against one subdomain
    pub async fn list_by_subdomain(&self, subdomain_id: Uuid) -> Vec<Vulnerability> {
        let vulnerabilities = self.vulnerabilities.read().await;
        let mut found: Vec<Vulnerability> = vulnerabilities
            .values()
            .filter(|v| v.subdomain_id == subdomain_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }

    /// List vulnerabilities across a whole project
    pub async fn list_by_project(&self, project_id: Uuid) -> Vec<Vulnerability> {
        let vulnerabilities = self.vulnerabilities.read().await;
        let mut found: Vec<Vulnerability> = vulnerabilities
            .values()
            .filter(|v| v.project_id == project_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }

    /// Update a vulnerability
    pub async fn update(&self, vulnerability: Vulnerability) -> Result<Vulnerability> {
        let updated = {
            let mut vulnerabilities = self.vulnerabilities.write().await;
            if !vulnerabilities.contains_key(&vulnerability.id) {
                return Err(Error::NotFound(format!(
                    "Vulnerability {} not found",
                    vulnerability.id
                )));
            }
            let mut updated = vulnerability;
            updated.updated_at = chrono::Utc::now();
            vulnerabilities.insert(updated.id, updated.clone());
            updated
        };
        self.persist().await?;
        Ok(updated)
    }

    /// Delete a vulnerability by ID
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let removed = {
            let mut vulnerabilities = self.vulnerabilities.write().await;
            vulnerabilities.remove(&id).is_some()
        };
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Delete every vulnerability belonging to a project, returning
    /// how many were removed
    pub async fn delete_by_project(&self, project_id: Uuid) -> Result<usize> {
        let removed = {
            let mut vulnerabilities = self.vulnerabilities.write().await;
            let before = vulnerabilities.len();
            vulnerabilities.retain(|_, v| v.project_id != project_id);
            before - vulnerabilities.len()
        };
        if removed > 0 {
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Persist the current state to file
    async fn persist(&self) -> Result<()> {
        let vulnerabilities = self.vulnerabilities.read().await;
        let content = serde_json::to_string_pretty(&*vulnerabilities)
            .map_err(|e| Error::Storage(format!("Failed to serialize vulnerabilities: {}", e)))?;

        if let Some(parent) = self.file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;
        }

        tokio::fs::write(&self.file_path, content)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write vulnerabilities file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vulnerability::Severity;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let dir = tempdir().unwrap();
        let store = VulnerabilityStore::new(dir.path().join("vulns.json"))
            .await
            .unwrap();

        let subdomain_id = Uuid::new_v4();
        let project_id = Uuid::new_v4();
        let vuln = Vulnerability::new(subdomain_id, project_id, "IDOR on /orders", Severity::High);
        let id = vuln.id;
        store.create(vuln).await.unwrap();

        assert_eq!(store.list_by_subdomain(subdomain_id).await.len(), 1);
        assert_eq!(store.list_by_project(project_id).await.len(), 1);

        let mut vuln = store.get(id).await.unwrap();
        vuln.status = crate::vulnerability::VulnerabilityStatus::Fixed;
        store.update(vuln).await.unwrap();

        assert!(store.delete(id).await.unwrap());
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_by_project() {
        let dir = tempdir().unwrap();
        let store = VulnerabilityStore::new(dir.path().join("vulns.json"))
            .await
            .unwrap();

        let project_a = Uuid::new_v4();
        let project_b = Uuid::new_v4();
        for i in 0..3 {
            store
                .create(Vulnerability::new(
                    Uuid::new_v4(),
                    project_a,
                    format!("finding {}", i),
                    Severity::Low,
                ))
                .await
                .unwrap();
        }
        store
            .create(Vulnerability::new(
                Uuid::new_v4(),
                project_b,
                "unrelated",
                Severity::Medium,
            ))
            .await
            .unwrap();

        let removed = store.delete_by_project(project_a).await.unwrap();
        assert_eq!(removed, 3);
        assert_eq!(store.list_by_project(project_a).await.len(), 0);
        assert_eq!(store.list_by_project(project_b).await.len(), 1);
    }
}
