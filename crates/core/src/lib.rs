//! Core library for Recon Board
//!
//! This crate contains the core domain types and persistence, including:
//! - Background task records and their store
//! - Project management
//! - Subdomain and vulnerability records

pub mod error;
pub mod project;
pub mod subdomain;
pub mod task;
pub mod vulnerability;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
