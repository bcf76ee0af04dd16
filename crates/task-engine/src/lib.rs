//! Task Engine - resumable background work for Recon Board
//!
//! Long-running jobs (subdomain enumeration across external data
//! sources, cascading project deletion) run as persisted tasks that an
//! external trigger advances one bounded slice at a time. Progress and
//! partial results live on the task record, so any invocation can pick
//! up exactly where the previous one stopped.

mod config;
mod deletion;
mod enumerate;
mod error;
mod orchestrator;
mod source;
mod sources;

pub use config::{EngineConfig, SourceCredentials};
pub use deletion::{DeletionExecutor, DeletionSlice};
pub use enumerate::{EnumerationExecutor, EnumerationSlice};
pub use error::{EngineError, Result};
pub use orchestrator::TaskOrchestrator;
pub use source::{SourceOutcome, SourceRegistry, SubdomainSource};
pub use sources::{Censys, CertSpotter, CrtSh, SecurityTrails};
