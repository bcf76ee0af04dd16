//! File-based task storage implementation
//!
//! Stores task records as JSON in a file on disk, fronted by an
//! in-memory cache. All mutation happens under the cache's write lock,
//! which makes every read-modify-write (including lease claims)
//! atomic with respect to concurrent invocations in this process.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{Task, TaskStatus};
use super::repository::{ClaimOutcome, TaskRepository};
use crate::{Error, Result};

/// File-backed task store using JSON
pub struct FileTaskStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory cache of tasks
    cache: RwLock<HashMap<Uuid, Task>>,
}

impl FileTaskStore {
    /// Create a new FileTaskStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    /// Leases never survive a restart: a process that died mid-slice
    /// must not leave its tasks permanently claimed.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let tasks: Vec<Task> = serde_json::from_str(&content)?;
            tasks
                .into_iter()
                .map(|mut t| {
                    t.leased = false;
                    (t.id, t)
                })
                .collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    /// Persist the cache to disk
    async fn persist(&self) -> Result<()> {
        let cache = self.cache.read().await;
        let tasks: Vec<&Task> = cache.values().collect();
        let content = serde_json::to_string_pretty(&tasks)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for FileTaskStore {
    async fn create(&self, task: Task) -> Result<Task> {
        {
            let mut cache = self.cache.write().await;
            if cache.contains_key(&task.id) {
                return Err(Error::InvalidInput(format!(
                    "Task with ID {} already exists",
                    task.id
                )));
            }
            cache.insert(task.id, task.clone());
        }
        self.persist().await?;
        Ok(task)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        let cache = self.cache.read().await;
        Ok(cache.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Task>> {
        let cache = self.cache.read().await;
        let mut tasks: Vec<Task> = cache.values().cloned().collect();
        // Sort by created_at descending (newest first)
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn update(&self, mut task: Task) -> Result<Task> {
        task.updated_at = Utc::now();
        {
            let mut cache = self.cache.write().await;
            if !cache.contains_key(&task.id) {
                return Err(Error::TaskNotFound(task.id.to_string()));
            }
            cache.insert(task.id, task.clone());
        }
        self.persist().await?;
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let removed = {
            let mut cache = self.cache.write().await;
            cache.remove(&id).is_some()
        };
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }

    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        let cache = self.cache.read().await;
        let mut tasks: Vec<Task> = cache
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn try_claim(&self, id: Uuid) -> Result<ClaimOutcome> {
        let outcome = {
            let mut cache = self.cache.write().await;
            let task = cache
                .get_mut(&id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;

            if task.status.is_terminal() {
                return Ok(ClaimOutcome::Terminal(task.clone()));
            }
            if task.leased {
                return Ok(ClaimOutcome::Busy);
            }

            task.leased = true;
            task.status = TaskStatus::Processing;
            task.updated_at = Utc::now();
            ClaimOutcome::Claimed(task.clone())
        };
        self.persist().await?;
        Ok(outcome)
    }

    async fn release(&self, id: Uuid) -> Result<()> {
        let changed = {
            let mut cache = self.cache.write().await;
            match cache.get_mut(&id) {
                Some(task) if task.leased => {
                    task.leased = false;
                    task.updated_at = Utc::now();
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.persist().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskData;
    use tempfile::TempDir;

    fn enumeration_task() -> Task {
        Task::new(TaskData::SubdomainEnumeration {
            project_id: Uuid::new_v4(),
            target_domain: "example.com".to_string(),
        })
    }

    async fn create_test_store() -> (FileTaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let store = FileTaskStore::new(&path).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_create_and_get_task() {
        let (store, _temp) = create_test_store().await;

        let task = enumeration_task();
        let id = task.id;
        store.create(task).await.unwrap();

        let retrieved = store.get(id).await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().id, id);

        // Non-existent task
        let non_existent = store.get(Uuid::new_v4()).await.unwrap();
        assert!(non_existent.is_none());
    }

    #[tokio::test]
    async fn test_update_task() {
        let (store, _temp) = create_test_store().await;

        let task = enumeration_task();
        let id = task.id;
        store.create(task).await.unwrap();

        let mut updated = store.get(id).await.unwrap().unwrap();
        updated.status = TaskStatus::Processing;
        updated.progress = 33;

        let result = store.update(updated).await.unwrap();
        assert_eq!(result.status, TaskStatus::Processing);
        assert_eq!(result.progress, 33);

        let retrieved = store.get(id).await.unwrap().unwrap();
        assert_eq!(retrieved.progress, 33);
    }

    #[tokio::test]
    async fn test_update_nonexistent_task() {
        let (store, _temp) = create_test_store().await;

        let result = store.update(enumeration_task()).await;
        assert!(result.is_err());
        match result.unwrap_err() {
            Error::TaskNotFound(_) => {}
            e => panic!("Expected TaskNotFound error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_find_by_status() {
        let (store, _temp) = create_test_store().await;

        store.create(enumeration_task()).await.unwrap();
        store.create(enumeration_task()).await.unwrap();

        let mut failed = enumeration_task();
        failed.status = TaskStatus::Failed;
        store.create(failed).await.unwrap();

        let pending = store.find_by_status(TaskStatus::Pending).await.unwrap();
        assert_eq!(pending.len(), 2);

        let completed = store.find_by_status(TaskStatus::Completed).await.unwrap();
        assert_eq!(completed.len(), 0);
    }

    #[tokio::test]
    async fn test_claim_and_release() {
        let (store, _temp) = create_test_store().await;

        let task = enumeration_task();
        let id = task.id;
        store.create(task).await.unwrap();

        // First claim wins and flips the task to Processing
        let first = store.try_claim(id).await.unwrap();
        let claimed = match first {
            ClaimOutcome::Claimed(t) => t,
            other => panic!("Expected Claimed, got: {:?}", other),
        };
        assert_eq!(claimed.status, TaskStatus::Processing);
        assert!(claimed.leased);

        // Second claim sees the lease
        let second = store.try_claim(id).await.unwrap();
        assert!(matches!(second, ClaimOutcome::Busy));

        // After release the task can be claimed again
        store.release(id).await.unwrap();
        let third = store.try_claim(id).await.unwrap();
        assert!(matches!(third, ClaimOutcome::Claimed(_)));
    }

    #[tokio::test]
    async fn test_claim_terminal_task_is_noop() {
        let (store, _temp) = create_test_store().await;

        let mut task = enumeration_task();
        task.status = TaskStatus::Completed;
        task.progress = 100;
        let id = task.id;
        store.create(task).await.unwrap();

        let outcome = store.try_claim(id).await.unwrap();
        match outcome {
            ClaimOutcome::Terminal(t) => {
                assert_eq!(t.status, TaskStatus::Completed);
                assert!(!t.leased);
            }
            other => panic!("Expected Terminal, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_claim_unknown_task() {
        let (store, _temp) = create_test_store().await;

        let result = store.try_claim(Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::TaskNotFound(_))));
    }

    #[tokio::test]
    async fn test_lease_not_persisted_across_restart() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");

        let task_id;
        {
            let store = FileTaskStore::new(&path).await.unwrap();
            let task = enumeration_task();
            task_id = task.id;
            store.create(task).await.unwrap();
            store.try_claim(task_id).await.unwrap();
        }

        // A fresh instance must be able to claim the task again
        let store = FileTaskStore::new(&path).await.unwrap();
        let task = store.get(task_id).await.unwrap().unwrap();
        assert!(!task.leased);
        assert!(matches!(
            store.try_claim(task_id).await.unwrap(),
            ClaimOutcome::Claimed(_)
        ));
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");

        let task_id;
        {
            let store = FileTaskStore::new(&path).await.unwrap();
            let mut task = enumeration_task();
            task.progress = 66;
            task.status = TaskStatus::Processing;
            task_id = task.id;
            store.create(task).await.unwrap();
        }

        let store = FileTaskStore::new(&path).await.unwrap();
        let task = store.get(task_id).await.unwrap();
        assert!(task.is_some());
        let task = task.unwrap();
        assert_eq!(task.progress, 66);
        assert_eq!(task.status, TaskStatus::Processing);
    }

    #[tokio::test]
    async fn test_duplicate_task_error() {
        let (store, _temp) = create_test_store().await;

        let task = enumeration_task();
        store.create(task.clone()).await.unwrap();

        let result = store.create(task).await;
        assert!(result.is_err());
        match result.unwrap_err() {
            Error::InvalidInput(msg) => {
                assert!(msg.contains("already exists"));
            }
            e => panic!("Expected InvalidInput error, got: {:?}", e),
        }
    }
}
