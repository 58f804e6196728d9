//! Remote jobs: endpoint templates and the HTTP job backend

pub mod backend;
pub mod endpoints;

pub use backend::RemoteJobBackend;
pub use endpoints::{JobEndpoints, JobEndpointsBuilder, StartProtocol};
