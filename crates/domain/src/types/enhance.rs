//! Synchronous single-request enrichment (Ping Data `enhance`)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::activity::QueryParams;
use crate::types::sources::DataSource;

/// Parameters of an enhance call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnhanceRequest {
    pub addresses: Vec<String>,
    pub sources: Vec<DataSource>,
    /// Server-side time budget in seconds.
    pub timeout: Option<f64>,
    pub include_raw_response: bool,
    /// Additional location attributes (`country`, `insured_name`, ...).
    pub extra_location_fields: Vec<(String, String)>,
}

impl EnhanceRequest {
    pub fn to_params(&self) -> QueryParams {
        let mut params: QueryParams =
            self.addresses.iter().map(|a| ("address".to_string(), a.clone())).collect();
        params.extend(self.extra_location_fields.iter().cloned());
        if let Some(timeout) = self.timeout {
            params.push(("timeout".to_string(), timeout.to_string()));
        }
        params.extend(self.sources.iter().map(|s| ("sources".to_string(), s.code().to_string())));
        params.push(("include_raw_response".to_string(), self.include_raw_response.to_string()));
        params
    }
}

/// Result of one data source for an enhanced location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    #[serde(default)]
    pub is_success: Option<bool>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Enhance response keyed by data source code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhanceResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub location_data: BTreeMap<String, SourceResult>,
}

impl EnhanceResponse {
    pub fn source(&self, source: DataSource) -> Option<&SourceResult> {
        self.location_data.get(source.code())
    }
}
