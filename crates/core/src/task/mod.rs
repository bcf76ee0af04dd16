//! Task module
//!
//! Task records for resumable background jobs and their stores.

mod file_store;
mod memory_store;
mod model;
mod repository;

pub use file_store::FileTaskStore;
pub use memory_store::MemoryTaskStore;
pub use model::*;
pub use repository::{ClaimOutcome, TaskRepository};
