//! Data source registry
//!
//! An ordered, fixed list of pluggable enumeration sources. Each
//! source is independently failable: a network error, missing
//! credential or malformed response yields an empty name list and
//! never aborts the slice that invoked it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::config::SourceCredentials;
use crate::sources::{Censys, CertSpotter, CrtSh, SecurityTrails};
use crate::Result;

/// A pluggable subdomain enumeration source
#[async_trait]
pub trait SubdomainSource: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Discover hostnames under the given apex domain
    async fn discover(&self, domain: &str) -> Result<Vec<String>>;
}

/// Result of invoking one source
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub names: Vec<String>,
    /// False when the source failed and contributed nothing
    pub ok: bool,
}

/// Ordered collection of enumeration sources
///
/// The order is part of the resumption contract: a task's progress
/// percentage maps back to an index into this list, so the registry a
/// resumed task sees must have the same length and order as the one
/// its earlier slices saw.
pub struct SourceRegistry {
    sources: Vec<Arc<dyn SubdomainSource>>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<Arc<dyn SubdomainSource>>) -> Self {
        Self { sources }
    }

    /// Build the production registry from credentials
    pub fn from_credentials(credentials: SourceCredentials) -> Self {
        let client = reqwest::Client::new();
        Self::new(vec![
            Arc::new(SecurityTrails::new(
                client.clone(),
                credentials.securitytrails_api_key,
            )),
            Arc::new(Censys::new(
                client.clone(),
                credentials.censys_api_id,
                credentials.censys_api_secret,
            )),
            Arc::new(CertSpotter::new(
                client.clone(),
                credentials.certspotter_api_key,
            )),
            Arc::new(CrtSh::new(client)),
        ])
    }

    /// Total number of sources; the denominator for progress math
    pub fn count(&self) -> usize {
        self.sources.len()
    }

    /// Invoke the source at `index` against `domain`
    ///
    /// A failing source (or an out-of-range index) is logged and
    /// reported as `{names: [], ok: false}`.
    pub async fn invoke(&self, index: usize, domain: &str) -> SourceOutcome {
        let Some(source) = self.sources.get(index) else {
            warn!(index, "source index out of range");
            return SourceOutcome {
                names: Vec::new(),
                ok: false,
            };
        };

        match source.discover(domain).await {
            Ok(names) => SourceOutcome { names, ok: true },
            Err(e) => {
                warn!(source = source.name(), error = %e, "source failed, continuing");
                SourceOutcome {
                    names: Vec::new(),
                    ok: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;

    struct Fixed(Vec<&'static str>);

    #[async_trait]
    impl SubdomainSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn discover(&self, _domain: &str) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct Failing;

    #[async_trait]
    impl SubdomainSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn discover(&self, _domain: &str) -> Result<Vec<String>> {
            Err(EngineError::Source("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_invoke_returns_names() {
        let registry = SourceRegistry::new(vec![Arc::new(Fixed(vec!["a.acme.com", "b.acme.com"]))]);

        let outcome = registry.invoke(0, "acme.com").await;
        assert!(outcome.ok);
        assert_eq!(outcome.names.len(), 2);
    }

    #[tokio::test]
    async fn test_failing_source_is_not_fatal() {
        let registry = SourceRegistry::new(vec![Arc::new(Failing)]);

        let outcome = registry.invoke(0, "acme.com").await;
        assert!(!outcome.ok);
        assert!(outcome.names.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_index() {
        let registry = SourceRegistry::new(vec![]);
        assert_eq!(registry.count(), 0);

        let outcome = registry.invoke(3, "acme.com").await;
        assert!(!outcome.ok);
    }

    #[test]
    fn test_production_registry_order_is_fixed() {
        let registry = SourceRegistry::from_credentials(SourceCredentials::default());
        assert_eq!(registry.count(), 4);
    }
}
