//! [`JobBackend`] over HTTP, driven by [`JobEndpoints`] templates

use std::sync::Arc;

use pingintel_core::JobBackend;
use pingintel_domain::{
    Job, JobInput, JobKind, JobOptions, JobSnapshot, JobStatusResponse, PingError, Result,
    StartJobResponse,
};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::endpoints::{with_id, with_sovid, JobEndpoints, StartProtocol};
use crate::api::ApiClient;
use crate::http::MultipartBody;

/// Remote job backend for one job kind
pub struct RemoteJobBackend {
    client: Arc<ApiClient>,
    endpoints: JobEndpoints,
}

impl RemoteJobBackend {
    pub fn new(client: Arc<ApiClient>, endpoints: JobEndpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn endpoints(&self) -> &JobEndpoints {
        &self.endpoints
    }

    fn start_multipart(&self, path: &str, input: &JobInput, options: &JobOptions) -> Result<Job> {
        let JobInput::Files(files) = input else {
            return Err(mismatch(self.endpoints.kind()));
        };
        let mut body = files
            .iter()
            .fold(MultipartBody::new(), |body, file| body.file("file", file.clone()));
        body.fields.extend(multipart_fields(options));

        let response: StartJobResponse = self.client.post_multipart(path, body)?;
        Ok(response.into_job(self.endpoints.kind()))
    }

    fn start_json(&self, path: &str, input: &JobInput, options: &JobOptions) -> Result<Job> {
        let JobInput::Locations { records, sources } = input else {
            return Err(mismatch(self.endpoints.kind()));
        };
        let mut body = Map::new();
        body.insert("locations".into(), serde_json::to_value(records)?);
        body.insert("sources".into(), serde_json::to_value(sources)?);
        let optional =
            [("callback_url", &options.callback_url), ("client_ref", &options.client_ref)];
        for (key, value) in optional {
            if let Some(value) = value {
                body.insert(key.into(), json!(value));
            }
        }
        body.extend(options.extra.clone());

        let response: StartJobResponse = self.client.post_json(path, Value::Object(body))?;
        Ok(response.into_job(self.endpoints.kind()))
    }

    fn start_staged(
        &self,
        (init, add_locations, start): (&str, &str, &str),
        input: &JobInput,
        options: &JobOptions,
    ) -> Result<Job> {
        let JobInput::Revision { source_id, location_files } = input else {
            return Err(mismatch(self.endpoints.kind()));
        };
        if options.callback_url.as_deref().is_some_and(|url| !url.is_empty()) {
            return Err(PingError::Validation(format!(
                "{} jobs do not accept a callback_url.",
                self.endpoints.kind()
            )));
        }

        let mut fields = Vec::new();
        if let Some(client_ref) = options.client_ref.as_deref().filter(|v| !v.is_empty()) {
            fields.push(("client_ref".to_string(), client_ref.to_string()));
        }
        let session: StartJobResponse =
            self.client.post_form(&with_sovid(init, source_id), fields)?;
        debug!(sovid = %source_id, session = %session.id, "Opened revision session");

        for file in location_files {
            let body = MultipartBody::new().file("file", file.clone());
            let _: Value = self.client.post_multipart(&with_id(add_locations, &session.id), body)?;
            debug!(session = %session.id, filename = %file.filename, "Uploaded locations");
        }

        let mut body: Map<String, Value> = options
            .extra
            .iter()
            .filter(|(_, value)| !is_blank(value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if !options.output_formats.is_empty() {
            body.insert("output_formats".into(), json!(options.output_formats));
        }
        let started: Value =
            self.client.post_json(&with_id(start, &session.id), Value::Object(body))?;

        let message = started.get("message").and_then(Value::as_str).map(str::to_string);
        Ok(Job {
            id: session.id,
            kind: self.endpoints.kind(),
            message: message.or(session.message),
        })
    }
}

impl JobBackend for RemoteJobBackend {
    fn kind(&self) -> JobKind {
        self.endpoints.kind()
    }

    fn start(&self, input: &JobInput, options: &JobOptions) -> Result<Job> {
        match self.endpoints.start() {
            StartProtocol::Multipart { path } => self.start_multipart(path, input, options),
            StartProtocol::Json { path } => self.start_json(path, input, options),
            StartProtocol::Staged { init, add_locations, start } => {
                self.start_staged((init, add_locations, start), input, options)
            }
        }
    }

    fn fetch_status(&self, job_id: &str) -> Result<JobSnapshot> {
        let response: JobStatusResponse = self
            .client
            .get_json(&self.endpoints.status_path(job_id), self.endpoints.status_query().clone())?;
        JobSnapshot::from_response(job_id, response)
    }
}

fn mismatch(kind: JobKind) -> PingError {
    PingError::Validation(format!("Input does not match a {kind} job."))
}

/// `null`, `""`, `[]` and `{}` are left out of start bodies.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Text fields of a document start request. List options repeat the field.
fn multipart_fields(options: &JobOptions) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    let mut push = |name: &str, value: &str| {
        if !value.is_empty() {
            fields.push((name.to_string(), value.to_string()));
        }
    };

    if let Some(value) = &options.callback_url {
        push("callback_url", value);
    }
    if let Some(value) = &options.document_type {
        push("document_type", value);
    }
    for format in &options.output_formats {
        push("output_formats", format);
    }
    if let Some(value) = &options.client_ref {
        push("client_ref", value);
    }
    for integration in options.integrations.iter().flatten() {
        push("integrations", integration);
    }
    if let Some(value) = &options.delegate_to {
        push("delegate_to", value);
    }
    for (key, value) in &options.extra {
        match value {
            Value::String(text) => push(key, text),
            other if !is_blank(other) => push(key, &other.to_string()),
            _ => {}
        }
    }
    fields
}
