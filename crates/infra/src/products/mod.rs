//! Per-product API clients
//!
//! Each client wraps an [`ApiClient`](crate::api::ApiClient) configured for
//! its product. [`connect`] resolves URL and credentials from the loaded
//! settings.

mod pingdata;
mod pingmaps;
mod pingradar;
mod pingvision;
mod sovfixer;
mod submissions;

pub use pingdata::PingDataClient;
pub use pingmaps::PingMapsClient;
pub use pingradar::PingRadarClient;
pub use pingvision::PingVisionClient;
pub use sovfixer::SovFixerClient;
pub use submissions::ReadinessPolicy;

use pingintel_domain::{ClientSettings, ProductSpec, Result};

use crate::api::ApiClient;

/// Build an [`ApiClient`] for `spec` from loaded settings.
pub fn connect(spec: ProductSpec, settings: ClientSettings) -> Result<ApiClient> {
    ApiClient::builder(spec).settings(settings).build()
}
