//! Subdomain persistent store
//!
//! File-based persistence for subdomains. The batch listing here is
//! what the deletion slice executor pages through, so its ordering
//! must be stable across invocations.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Error;
use crate::Result;

use super::model::{DiscoveryMethod, Subdomain};

/// Thread-safe subdomain store with file persistence
#[derive(Clone)]
pub struct SubdomainStore {
    /// In-memory cache of subdomains
    subdomains: Arc<RwLock<HashMap<Uuid, Subdomain>>>,
    /// Path to the subdomains JSON file
    file_path: PathBuf,
}

impl SubdomainStore {
    /// Create a new SubdomainStore with the given file path
    pub async fn new(file_path: PathBuf) -> Result<Self> {
        let subdomains = if file_path.exists() {
            let content = tokio::fs::read_to_string(&file_path)
                .await
                .map_err(|e| Error::Storage(format!("Failed to read subdomains file: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| Error::Storage(format!("Failed to parse subdomains file: {}", e)))?
        } else {
            HashMap::new()
        };

        Ok(Self {
            subdomains: Arc::new(RwLock::new(subdomains)),
            file_path,
        })
    }

    /// Create a new subdomain record
    pub async fn create(&self, subdomain: Subdomain) -> Result<Subdomain> {
        {
            let mut subdomains = self.subdomains.write().await;
            if subdomains.contains_key(&subdomain.id) {
                return Err(Error::InvalidInput(format!(
                    "Subdomain with ID {} already exists",
                    subdomain.id
                )));
            }
            subdomains.insert(subdomain.id, subdomain.clone());
        }
        self.persist().await?;
        Ok(subdomain)
    }

    /// Create or refresh a subdomain keyed by (project_id, hostname)
    ///
    /// Idempotent: an existing record only gets its `updated_at`
    /// refreshed, so repeated materialization of enumeration results
    /// never creates duplicates.
    pub async fn upsert(
        &self,
        project_id: Uuid,
        hostname: &str,
        discovery_method: DiscoveryMethod,
    ) -> Result<Subdomain> {
        let subdomain = {
            let mut subdomains = self.subdomains.write().await;

            let existing = subdomains
                .values_mut()
                .find(|s| s.project_id == project_id && s.hostname == hostname);

            if let Some(record) = existing {
                record.updated_at = chrono::Utc::now();
                record.clone()
            } else {
                let record = Subdomain::new(hostname, project_id, discovery_method);
                subdomains.insert(record.id, record.clone());
                record
            }
        };
        self.persist().await?;
        Ok(subdomain)
    }

    /// Get a subdomain by ID
    pub async fn get(&self, id: Uuid) -> Option<Subdomain> {
        let subdomains = self.subdomains.read().await;
        subdomains.get(&id).cloned()
    }

    /// List all subdomains for a project
    pub async fn list_by_project(&self, project_id: Uuid) -> Vec<Subdomain> {
        let subdomains = self.subdomains.read().await;
        let mut found: Vec<Subdomain> = subdomains
            .values()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        found
    }

    /// Count subdomains belonging to a project
    pub async fn count_by_project(&self, project_id: Uuid) -> usize {
        let subdomains = self.subdomains.read().await;
        subdomains
            .values()
            .filter(|s| s.project_id == project_id)
            .count()
    }

    /// List one page of a project's subdomains
    ///
    /// Ordering is stable (created_at, then id) so that an offset
    /// cursor held across invocations pages deterministically.
    pub async fn list_batch(&self, project_id: Uuid, offset: usize, limit: usize) -> Vec<Subdomain> {
        self.list_by_project(project_id)
            .await
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect()
    }

    /// Update a subdomain
    pub async fn update(&self, subdomain: Subdomain) -> Result<Subdomain> {
        let updated = {
            let mut subdomains = self.subdomains.write().await;
            if !subdomains.contains_key(&subdomain.id) {
                return Err(Error::NotFound(format!(
                    "Subdomain {} not found",
                    subdomain.id
                )));
            }
            let mut updated = subdomain;
            updated.updated_at = chrono::Utc::now();
            subdomains.insert(updated.id, updated.clone());
            updated
        };
        self.persist().await?;
        Ok(updated)
    }

    /// Delete a subdomain by ID
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let removed = {
            let mut subdomains = self.subdomains.write().await;
            subdomains.remove(&id).is_some()
        };
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Persist the current state to file
    async fn persist(&self) -> Result<()> {
        let subdomains = self.subdomains.read().await;
        let content = serde_json::to_string_pretty(&*subdomains)
            .map_err(|e| Error::Storage(format!("Failed to serialize subdomains: {}", e)))?;

        // Ensure parent directory exists
        if let Some(parent) = self.file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;
        }

        tokio::fs::write(&self.file_path, content)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write subdomains file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn create_test_store() -> (SubdomainStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = SubdomainStore::new(dir.path().join("subdomains.json"))
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let (store, _dir) = create_test_store().await;
        let project_id = Uuid::new_v4();

        let first = store
            .upsert(project_id, "www.acme.com", DiscoveryMethod::AutoEnumeration)
            .await
            .unwrap();
        let second = store
            .upsert(project_id, "www.acme.com", DiscoveryMethod::AutoEnumeration)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.count_by_project(project_id).await, 1);
    }

    #[tokio::test]
    async fn test_upsert_same_hostname_different_project() {
        let (store, _dir) = create_test_store().await;
        let project_a = Uuid::new_v4();
        let project_b = Uuid::new_v4();

        store
            .upsert(project_a, "www.acme.com", DiscoveryMethod::AutoEnumeration)
            .await
            .unwrap();
        store
            .upsert(project_b, "www.acme.com", DiscoveryMethod::AutoEnumeration)
            .await
            .unwrap();

        assert_eq!(store.count_by_project(project_a).await, 1);
        assert_eq!(store.count_by_project(project_b).await, 1);
    }

    #[tokio::test]
    async fn test_list_batch_paging() {
        let (store, _dir) = create_test_store().await;
        let project_id = Uuid::new_v4();

        for i in 0..7 {
            store
                .upsert(
                    project_id,
                    &format!("host{}.acme.com", i),
                    DiscoveryMethod::AutoEnumeration,
                )
                .await
                .unwrap();
        }

        let page1 = store.list_batch(project_id, 0, 3).await;
        let page2 = store.list_batch(project_id, 3, 3).await;
        let page3 = store.list_batch(project_id, 6, 3).await;

        assert_eq!(page1.len(), 3);
        assert_eq!(page2.len(), 3);
        assert_eq!(page3.len(), 1);

        // Pages must not overlap
        let mut all: Vec<Uuid> = page1
            .iter()
            .chain(&page2)
            .chain(&page3)
            .map(|s| s.id)
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 7);
    }

    #[tokio::test]
    async fn test_delete() {
        let (store, _dir) = create_test_store().await;
        let project_id = Uuid::new_v4();

        let sub = store
            .upsert(project_id, "www.acme.com", DiscoveryMethod::Manual)
            .await
            .unwrap();

        assert!(store.delete(sub.id).await.unwrap());
        assert!(!store.delete(sub.id).await.unwrap());
        assert_eq!(store.count_by_project(project_id).await, 0);
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subdomains.json");
        let project_id = Uuid::new_v4();

        {
            let store = SubdomainStore::new(path.clone()).await.unwrap();
            store
                .upsert(project_id, "api.acme.com", DiscoveryMethod::AutoEnumeration)
                .await
                .unwrap();
        }

        let store = SubdomainStore::new(path).await.unwrap();
        assert_eq!(store.count_by_project(project_id).await, 1);
    }
}
