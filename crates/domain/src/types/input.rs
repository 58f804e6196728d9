//! Inputs accepted when starting a job

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::sources::DataSource;

/// A document to upload, already read into memory so that the multipart body
/// can be rebuilt for every transport attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { filename: filename.into(), bytes: bytes.into() }
    }
}

/// One location submitted for enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Per-location override of the job's data sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<DataSource>>,
    /// Any further location attributes, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LocationRecord {
    pub fn with_address(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self { id: id.into(), address: Some(address.into()), ..Self::default() }
    }
}

/// What a job operates on.
#[derive(Debug, Clone, PartialEq)]
pub enum JobInput {
    /// Documents to parse.
    Files(Vec<UploadFile>),
    /// Locations to enrich from the given data sources.
    Locations { records: Vec<LocationRecord>, sources: Vec<DataSource> },
    /// A new revision of a previously parsed document, optionally replacing
    /// its location rows.
    Revision { source_id: String, location_files: Vec<UploadFile> },
}

/// Optional knobs shared by the start requests of every job kind.
///
/// Fields a given endpoint does not understand are simply not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobOptions {
    pub document_type: Option<String>,
    pub callback_url: Option<String>,
    pub client_ref: Option<String>,
    pub output_formats: Vec<String>,
    pub integrations: Option<Vec<String>>,
    pub delegate_to: Option<String>,
    /// Endpoint specific JSON fields (`extra_data`, `policy_terms`,
    /// `policy_terms_format_name`, `metadata`).
    pub extra: Map<String, Value>,
}

impl JobOptions {
    pub fn with_output_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}
