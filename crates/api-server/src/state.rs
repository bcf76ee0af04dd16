//! Application state

use std::path::PathBuf;
use std::sync::Arc;

use rb_core::project::ProjectStore;
use rb_core::subdomain::SubdomainStore;
use rb_core::task::FileTaskStore;
use rb_core::vulnerability::VulnerabilityStore;
use task_engine::{EngineConfig, SourceCredentials, SourceRegistry, TaskOrchestrator};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    data_dir: PathBuf,
    tasks: Arc<FileTaskStore>,
    projects: ProjectStore,
    subdomains: SubdomainStore,
    vulnerabilities: VulnerabilityStore,
    orchestrator: TaskOrchestrator,
    trigger_token: Option<String>,
}

impl AppState {
    /// Create a new AppState with stores under the given data directory
    ///
    /// Source credentials and the trigger token are read from the
    /// environment.
    pub async fn new(data_dir: PathBuf) -> rb_core::Result<Self> {
        let trigger_token = std::env::var("RB_TRIGGER_TOKEN").ok();
        Self::with_trigger_token(data_dir, trigger_token).await
    }

    /// Create a new AppState with an explicit trigger token
    pub async fn with_trigger_token(
        data_dir: PathBuf,
        trigger_token: Option<String>,
    ) -> rb_core::Result<Self> {
        let tasks = Arc::new(FileTaskStore::new(data_dir.join("tasks.json")).await?);
        let projects = ProjectStore::new(data_dir.join("projects.json")).await?;
        let subdomains = SubdomainStore::new(data_dir.join("subdomains.json")).await?;
        let vulnerabilities =
            VulnerabilityStore::new(data_dir.join("vulnerabilities.json")).await?;

        let registry = Arc::new(SourceRegistry::from_credentials(SourceCredentials::from_env()));
        let orchestrator = TaskOrchestrator::new(
            tasks.clone(),
            projects.clone(),
            subdomains.clone(),
            vulnerabilities.clone(),
            registry,
            EngineConfig::default(),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                data_dir,
                tasks,
                projects,
                subdomains,
                vulnerabilities,
                orchestrator,
                trigger_token,
            }),
        })
    }

    pub fn data_dir(&self) -> &std::path::Path {
        &self.inner.data_dir
    }

    pub fn tasks(&self) -> &Arc<FileTaskStore> {
        &self.inner.tasks
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.inner.projects
    }

    pub fn subdomains(&self) -> &SubdomainStore {
        &self.inner.subdomains
    }

    pub fn vulnerabilities(&self) -> &VulnerabilityStore {
        &self.inner.vulnerabilities
    }

    pub fn orchestrator(&self) -> &TaskOrchestrator {
        &self.inner.orchestrator
    }

    pub fn trigger_token(&self) -> Option<&str> {
        self.inner.trigger_token.as_deref()
    }
}
