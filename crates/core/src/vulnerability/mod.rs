//! Vulnerability module
//!
//! Findings recorded against subdomains.

mod model;
mod store;

pub use model::*;
pub use store::*;
