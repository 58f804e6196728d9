//! Ping Maps policy queries

use pingintel_domain::{PingError, PolicyQuery, Result};
use serde_json::Value;

use crate::api::ApiClient;

const POLICY_PATH: &str = "/api/v1/pli/policy";
const BREAKDOWN_PATH: &str = "/api/v1/pli/policy_breakdown";

/// Ping Maps API client
pub struct PingMapsClient {
    client: ApiClient,
}

impl PingMapsClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn api(&self) -> &ApiClient {
        &self.client
    }

    /// Policy locations matching `query`, as returned by the server.
    pub fn policy_locations(&self, query: &PolicyQuery) -> Result<Value> {
        validate(query)?;
        self.client.get_json(POLICY_PATH, query.to_params())
    }

    /// Aggregates of `query.fields` over the matching locations.
    pub fn policy_breakdown(&self, query: &PolicyQuery) -> Result<Value> {
        validate(query)?;
        self.client.get_json(BREAKDOWN_PATH, query.to_params())
    }
}

fn validate(query: &PolicyQuery) -> Result<()> {
    if query.sovid.trim().is_empty() {
        return Err(PingError::Validation("A sovid is required.".into()));
    }
    Ok(())
}
