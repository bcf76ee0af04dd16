//! Engine configuration
//!
//! Slice sizes and data source credentials. Credentials come from
//! environment variables; a missing credential disables the source
//! rather than failing enumeration.

/// Configuration for the task engine
///
/// Slice sizes are deliberately small so a single trigger invocation
/// finishes within a stateless worker's time budget.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of enumeration sources processed per slice
    pub slice_size: usize,
    /// Number of child records deleted per slice
    pub batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            slice_size: 5,
            batch_size: 100,
        }
    }
}

/// API credentials for the external enumeration sources
#[derive(Debug, Clone, Default)]
pub struct SourceCredentials {
    pub securitytrails_api_key: Option<String>,
    pub censys_api_id: Option<String>,
    pub censys_api_secret: Option<String>,
    pub certspotter_api_key: Option<String>,
}

impl SourceCredentials {
    /// Read credentials from the environment
    pub fn from_env() -> Self {
        Self {
            securitytrails_api_key: std::env::var("SECURITYTRAILS_API_KEY").ok(),
            censys_api_id: std::env::var("CENSYS_API_ID").ok(),
            censys_api_secret: std::env::var("CENSYS_API_SECRET").ok(),
            certspotter_api_key: std::env::var("CERTSPOTTER_API_KEY").ok(),
        }
    }
}
