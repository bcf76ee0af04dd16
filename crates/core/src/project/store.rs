//! Project persistent store
//!
//! Provides file-based persistence for projects.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Error;
use crate::Result;

use super::model::Project;

/// Thread-safe project store with file persistence
#[derive(Clone)]
pub struct ProjectStore {
    /// In-memory cache of projects
    projects: Arc<RwLock<HashMap<Uuid, Project>>>,
    /// Path to the projects JSON file
    file_path: PathBuf,
}

impl ProjectStore {
    /// Create a new ProjectStore with the given file path
    pub async fn new(file_path: PathBuf) -> Result<Self> {
        let projects = if file_path.exists() {
            let content = tokio::fs::read_to_string(&file_path)
                .await
                .map_err(|e| Error::Storage(format!("Failed to read projects file: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| Error::Storage(format!("Failed to parse projects file: {}", e)))?
        } else {
            HashMap::new()
        };

        Ok(Self {
            projects: Arc::new(RwLock::new(projects)),
            file_path,
        })
    }

    /// Create a new project
    pub async fn create(&self, project: Project) -> Result<Project> {
        {
            let mut projects = self.projects.write().await;
            if projects.contains_key(&project.id) {
                return Err(Error::InvalidInput(format!(
                    "Project with ID {} already exists",
                    project.id
                )));
            }
            projects.insert(project.id, project.clone());
        }
        self.persist().await?;
        Ok(project)
    }

    /// Get a project by ID
    pub async fn get(&self, id: Uuid) -> Option<Project> {
        let projects = self.projects.read().await;
        projects.get(&id).cloned()
    }

    /// List all projects, newest first
    pub async fn list(&self) -> Vec<Project> {
        let projects = self.projects.read().await;
        let mut all: Vec<Project> = projects.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    /// Update a project
    pub async fn update(&self, project: Project) -> Result<Project> {
        let updated = {
            let mut projects = self.projects.write().await;
            if !projects.contains_key(&project.id) {
                return Err(Error::ProjectNotFound(project.id.to_string()));
            }
            let mut updated = project;
            updated.updated_at = chrono::Utc::now();
            projects.insert(updated.id, updated.clone());
            updated
        };
        self.persist().await?;
        Ok(updated)
    }

    /// Delete a project
    pub async fn delete(&self, id: Uuid) -> Result<Option<Project>> {
        let removed = {
            let mut projects = self.projects.write().await;
            projects.remove(&id)
        };
        if removed.is_some() {
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Persist the current state to file
    async fn persist(&self) -> Result<()> {
        let projects = self.projects.read().await;
        let content = serde_json::to_string_pretty(&*projects)
            .map_err(|e| Error::Storage(format!("Failed to serialize projects: {}", e)))?;

        // Ensure parent directory exists
        if let Some(parent) = self.file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;
        }

        tokio::fs::write(&self.file_path, content)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write projects file: {}", e)))?;

        Ok(())
    }
}
