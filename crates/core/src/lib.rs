//! # Ping Intelligence Core
//!
//! Pure orchestration logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The generic job poller (start → poll → complete)
//! - Port interfaces (traits) for job backends and clocks
//! - Input validation run before any network call
//!
//! ## Architecture Principles
//! - Only depends on `pingintel-domain`
//! - No HTTP, file system or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod jobs;

pub use jobs::ports::{JobBackend, PollClock, SystemClock};
pub use jobs::service::{poll_until, validate_input, JobPoller, PollPolicy};
