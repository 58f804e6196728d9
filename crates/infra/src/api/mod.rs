//! Product API client shared by every product module

mod client;

pub use client::{ApiClient, ApiClientBuilder};

pub(crate) use client::decode_json;
