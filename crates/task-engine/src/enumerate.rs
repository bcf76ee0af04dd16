//! Enumeration slice executor
//!
//! Runs one bounded slice of a subdomain enumeration task: invokes the
//! next few sources from the registry, merges what they return into
//! the set accumulated by earlier slices, and reports how far through
//! the source list the task now is.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use rb_core::task::{Task, TaskData, TaskResult};

use crate::source::SourceRegistry;
use crate::{EngineError, Result};

/// Result of one enumeration slice
#[derive(Debug, Clone)]
pub struct EnumerationSlice {
    /// Cumulative deduplicated hostname set (superset of the input)
    pub subdomains: BTreeSet<String>,
    /// Sources processed so far, across all slices
    pub completed_sources: usize,
}

/// Executes enumeration slices against a source registry
pub struct EnumerationExecutor {
    registry: Arc<SourceRegistry>,
    slice_size: usize,
}

impl EnumerationExecutor {
    pub fn new(registry: Arc<SourceRegistry>, slice_size: usize) -> Self {
        Self {
            registry,
            slice_size,
        }
    }

    pub fn source_count(&self) -> usize {
        self.registry.count()
    }

    /// Run one slice of the given enumeration task
    ///
    /// The next source index is recovered from the persisted progress
    /// percentage as `progress * source_count / 100` (integer floor).
    /// This is the resumption contract: changing the rounding changes
    /// which sources get re-run after a resume.
    pub async fn run_slice(&self, task: &Task) -> Result<EnumerationSlice> {
        let TaskData::SubdomainEnumeration { target_domain, .. } = &task.data else {
            return Err(EngineError::KindMismatch {
                task_id: task.id,
                expected: "subdomain_enumeration",
            });
        };

        let source_count = self.registry.count();
        let next_index = task.progress as usize * source_count / 100;
        let end = (next_index + self.slice_size).min(source_count);

        // Union with prior results; the set never shrinks
        let mut subdomains = match &task.result {
            Some(TaskResult::Enumeration { subdomains, .. }) => subdomains.clone(),
            _ => BTreeSet::new(),
        };

        for index in next_index..end {
            let outcome = self.registry.invoke(index, target_domain).await;
            debug!(
                index,
                ok = outcome.ok,
                names = outcome.names.len(),
                "source slice step"
            );
            subdomains.extend(outcome.names);
        }

        Ok(EnumerationSlice {
            subdomains,
            completed_sources: end,
        })
    }

    /// Progress percentage after `completed_sources` sources
    pub fn progress_for(&self, completed_sources: usize) -> u8 {
        let source_count = self.registry.count();
        if source_count == 0 {
            return 100;
        }
        (completed_sources * 100 / source_count).min(100) as u8
    }

    /// Whether all sources have been processed
    pub fn is_complete(&self, completed_sources: usize) -> bool {
        completed_sources >= self.registry.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SubdomainSource;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct Names(Vec<String>);

    #[async_trait]
    impl SubdomainSource for Names {
        fn name(&self) -> &str {
            "names"
        }

        async fn discover(&self, _domain: &str) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl SubdomainSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn discover(&self, _domain: &str) -> Result<Vec<String>> {
            Err(EngineError::Source("timeout".to_string()))
        }
    }

    fn registry_of(count: usize) -> Arc<SourceRegistry> {
        let sources: Vec<Arc<dyn SubdomainSource>> = (0..count)
            .map(|i| {
                Arc::new(Names(vec![format!("host{}.acme.com", i)])) as Arc<dyn SubdomainSource>
            })
            .collect();
        Arc::new(SourceRegistry::new(sources))
    }

    fn task_with_progress(progress: u8) -> Task {
        let mut task = Task::new(TaskData::SubdomainEnumeration {
            project_id: Uuid::new_v4(),
            target_domain: "acme.com".to_string(),
        });
        task.progress = progress;
        task
    }

    #[tokio::test]
    async fn test_first_slice() {
        let executor = EnumerationExecutor::new(registry_of(15), 5);
        let task = task_with_progress(0);

        let slice = executor.run_slice(&task).await.unwrap();
        assert_eq!(slice.completed_sources, 5);
        assert_eq!(slice.subdomains.len(), 5);
        assert_eq!(executor.progress_for(slice.completed_sources), 33);
        assert!(!executor.is_complete(slice.completed_sources));
    }

    #[tokio::test]
    async fn test_resumption_index_from_progress() {
        let executor = EnumerationExecutor::new(registry_of(15), 5);

        // progress 33 -> floor(33 * 15 / 100) = 4, so the slice covers 4..9
        let task = task_with_progress(33);
        let slice = executor.run_slice(&task).await.unwrap();
        assert_eq!(slice.completed_sources, 9);

        // progress 100 -> index 15, nothing left to run
        let task = task_with_progress(100);
        let slice = executor.run_slice(&task).await.unwrap();
        assert_eq!(slice.completed_sources, 15);
        assert!(executor.is_complete(slice.completed_sources));
    }

    #[tokio::test]
    async fn test_merge_preserves_prior_results() {
        let executor = EnumerationExecutor::new(registry_of(4), 2);

        let mut task = task_with_progress(50);
        let prior: BTreeSet<String> =
            ["host0.acme.com".to_string(), "host1.acme.com".to_string()].into();
        task.result = Some(TaskResult::Enumeration {
            subdomains: prior.clone(),
            completed_sources: 2,
        });

        let slice = executor.run_slice(&task).await.unwrap();
        assert_eq!(slice.completed_sources, 4);
        assert!(slice.subdomains.is_superset(&prior));
        assert_eq!(slice.subdomains.len(), 4);
    }

    #[tokio::test]
    async fn test_failing_source_contributes_nothing() {
        let sources: Vec<Arc<dyn SubdomainSource>> = vec![
            Arc::new(Names(vec!["a.acme.com".to_string()])),
            Arc::new(Failing),
            Arc::new(Names(vec!["b.acme.com".to_string()])),
        ];
        let executor = EnumerationExecutor::new(Arc::new(SourceRegistry::new(sources)), 3);

        let slice = executor.run_slice(&task_with_progress(0)).await.unwrap();
        assert_eq!(slice.completed_sources, 3);
        assert_eq!(slice.subdomains.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_registry_completes_immediately() {
        let executor = EnumerationExecutor::new(Arc::new(SourceRegistry::new(vec![])), 5);

        let slice = executor.run_slice(&task_with_progress(0)).await.unwrap();
        assert_eq!(slice.completed_sources, 0);
        assert!(executor.is_complete(0));
        assert_eq!(executor.progress_for(0), 100);
    }

    #[tokio::test]
    async fn test_slice_size_not_divisible() {
        let executor = EnumerationExecutor::new(registry_of(7), 3);

        // 0..3, 3..6, 6..7
        let slice = executor.run_slice(&task_with_progress(0)).await.unwrap();
        assert_eq!(slice.completed_sources, 3);
        assert_eq!(executor.progress_for(3), 42);

        // floor(42 * 7 / 100) = 2: source 2 is deliberately re-run
        let slice = executor
            .run_slice(&task_with_progress(executor.progress_for(3)))
            .await
            .unwrap();
        assert_eq!(slice.completed_sources, 5);
    }

    #[tokio::test]
    async fn test_wrong_kind() {
        let executor = EnumerationExecutor::new(registry_of(2), 2);
        let task = Task::new(TaskData::ProjectDeletion {
            project_id: Uuid::new_v4(),
        });

        let result = executor.run_slice(&task).await;
        assert!(matches!(result, Err(EngineError::KindMismatch { .. })));
    }
}
