//! # Ping Intelligence Infrastructure
//!
//! Blocking HTTP implementations of the core job ports and the per-product
//! API clients.
//!
//! This crate contains:
//! - Retrying HTTP transport (reqwest, blocking)
//! - Credential resolution (explicit token, environment, `~/.pingintel.ini`)
//! - Settings loading (TOML/JSON files plus `PINGINTEL_*` overrides)
//! - Remote job backends, output downloads and cursor pagination
//! - SOV Fixer, Ping Data, Ping Vision, Ping Radar and Ping Maps clients
//!
//! ## Architecture
//! - Implements traits defined in `pingintel-core`
//! - Depends on `pingintel-domain` and `pingintel-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod http;
pub mod jobs;
pub mod output;
pub mod pagination;
pub mod products;
pub mod upload;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientBuilder};
pub use auth::UrlSignature;
pub use credentials::{Credential, CredentialResolver, EnvSource, ProcessEnv};
pub use errors::InfraError;
pub use http::{HttpClient, HttpRequest, MultipartBody};
pub use jobs::{JobEndpoints, RemoteJobBackend};
pub use output::{DownloadReport, DownloadTarget, OutputFetcher, OverwritePolicy};
pub use pagination::CursorPager;
pub use products::{
    connect, PingDataClient, PingMapsClient, PingRadarClient, PingVisionClient, ReadinessPolicy,
    SovFixerClient,
};
pub use upload::{read_upload, read_uploads};
