//! Remote job orchestration: start, poll, complete.

pub mod ports;
pub mod service;

pub use ports::{JobBackend, PollClock, SystemClock};
pub use service::{validate_input, JobPoller, PollPolicy};
