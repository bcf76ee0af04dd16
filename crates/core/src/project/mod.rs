//! Project module
//!
//! A Project represents one bug-bounty engagement. Subdomains and
//! vulnerabilities belong to Projects.

mod model;
mod store;

pub use model::*;
pub use store::*;
