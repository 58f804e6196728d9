//! # Ping Intelligence Domain
//!
//! Business domain types and response contracts for the Ping Intelligence
//! APIs (SOV Fixer, Ping Data, Ping Vision, Ping Radar, Ping Maps).
//!
//! This crate contains:
//! - Job lifecycle types (Job, JobStatus, JobSnapshot, JobResult, etc.)
//! - Closed vocabularies (data sources, activity filters, result statuses)
//! - Environment to serverspace mapping
//! - Client settings structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other Ping Intelligence crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
