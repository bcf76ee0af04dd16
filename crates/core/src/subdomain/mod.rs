//! Subdomain module
//!
//! Hostnames discovered under a project's target domain.

mod model;
mod store;

pub use model::*;
pub use store::*;
