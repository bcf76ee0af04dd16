//! In-memory task storage implementation
//!
//! Same semantics as [`FileTaskStore`](super::FileTaskStore) without
//! the file. Useful for tests and for embedding the engine without a
//! data directory.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{Task, TaskStatus};
use super::repository::{ClaimOutcome, TaskRepository};
use crate::{Error, Result};

/// In-memory task store
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskStore {
    async fn create(&self, task: Task) -> Result<Task> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(Error::InvalidInput(format!(
                "Task with ID {} already exists",
                task.id
            )));
        }
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let mut all: Vec<Task> = tasks.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update(&self, mut task: Task) -> Result<Task> {
        task.updated_at = Utc::now();
        let mut tasks = self.tasks.write().await;
        if !tasks.contains_key(&task.id) {
            return Err(Error::TaskNotFound(task.id.to_string()));
        }
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.remove(&id).is_some())
    }

    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let mut found: Vec<Task> = tasks
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn try_claim(&self, id: Uuid) -> Result<ClaimOutcome> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
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
        Ok(ClaimOutcome::Claimed(task.clone()))
    }

    async fn release(&self, id: Uuid) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        if let Some(task) = tasks.get_mut(&id) {
            if task.leased {
                task.leased = false;
                task.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}
