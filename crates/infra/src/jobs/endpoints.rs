//! Endpoint templates describing how each job kind is started and polled
//!
//! Paths may contain `{id}` (the job id) and `{sovid}` (the source document
//! of a revision). Values are percent-encoded when substituted.

use pingintel_domain::{JobKind, PingError, QueryParams, Result};

const ID: &str = "{id}";
const SOVID: &str = "{sovid}";

/// How a job is submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartProtocol {
    /// One multipart POST carrying the files and option fields.
    Multipart { path: String },
    /// One JSON POST carrying locations and sources.
    Json { path: String },
    /// Open a session for `{sovid}`, upload each location file to it, then
    /// start it with a JSON body.
    Staged { init: String, add_locations: String, start: String },
}

/// Start and status endpoints for one job kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEndpoints {
    kind: JobKind,
    start: StartProtocol,
    status: String,
    status_query: QueryParams,
}

impl JobEndpoints {
    pub fn builder(kind: JobKind) -> JobEndpointsBuilder {
        JobEndpointsBuilder { kind, start: None, status: None, status_query: QueryParams::new() }
    }

    /// `POST /api/v1/sov`, `GET /api/v1/sov/{id}?include_progress=true`
    pub fn parse_document() -> Self {
        Self {
            kind: JobKind::ParseDocument,
            start: StartProtocol::Multipart { path: "/api/v1/sov".into() },
            status: "/api/v1/sov/{id}".into(),
            status_query: vec![("include_progress".into(), "true".into())],
        }
    }

    /// `POST /api/v1/bulk_enhance`, `GET /api/v1/bulk_enhance/{id}`
    pub fn bulk_enhance() -> Self {
        Self {
            kind: JobKind::BulkEnhance,
            start: StartProtocol::Json { path: "/api/v1/bulk_enhance".into() },
            status: "/api/v1/bulk_enhance/{id}".into(),
            status_query: QueryParams::new(),
        }
    }

    /// Regenerate the outputs of a parsed document.
    pub fn regenerate_output() -> Self {
        Self::staged(JobKind::RegenerateOutput, "reoutput")
    }

    /// Update a parsed document with revised locations and metadata.
    pub fn update() -> Self {
        Self::staged(JobKind::Update, "update")
    }

    fn staged(kind: JobKind, verb: &str) -> Self {
        Self {
            kind,
            start: StartProtocol::Staged {
                init: format!("/api/v1/sov/{{sovid}}/{verb}"),
                add_locations: format!("/api/v1/sov/{verb}/{{id}}/add_locations"),
                start: format!("/api/v1/sov/{verb}/{{id}}/start"),
            },
            status: format!("/api/v1/sov/{verb}/{{id}}"),
            status_query: QueryParams::new(),
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn start(&self) -> &StartProtocol {
        &self.start
    }

    pub fn status_query(&self) -> &QueryParams {
        &self.status_query
    }

    /// Status path for `job_id`.
    pub fn status_path(&self, job_id: &str) -> String {
        with_id(&self.status, job_id)
    }
}

/// Substitute `{id}`.
pub fn with_id(template: &str, id: &str) -> String {
    template.replace(ID, &urlencoding::encode(id))
}

/// Substitute `{sovid}`.
pub fn with_sovid(template: &str, sovid: &str) -> String {
    template.replace(SOVID, &urlencoding::encode(sovid))
}

/// Builder for custom [`JobEndpoints`]
#[derive(Debug, Clone)]
pub struct JobEndpointsBuilder {
    kind: JobKind,
    start: Option<StartProtocol>,
    status: Option<String>,
    status_query: QueryParams,
}

impl JobEndpointsBuilder {
    pub fn multipart(mut self, path: impl Into<String>) -> Self {
        self.start = Some(StartProtocol::Multipart { path: path.into() });
        self
    }

    pub fn json(mut self, path: impl Into<String>) -> Self {
        self.start = Some(StartProtocol::Json { path: path.into() });
        self
    }

    pub fn staged(
        mut self,
        init: impl Into<String>,
        add_locations: impl Into<String>,
        start: impl Into<String>,
    ) -> Self {
        self.start = Some(StartProtocol::Staged {
            init: init.into(),
            add_locations: add_locations.into(),
            start: start.into(),
        });
        self
    }

    pub fn status(mut self, path: impl Into<String>) -> Self {
        self.status = Some(path.into());
        self
    }

    pub fn status_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.status_query.push((key.into(), value.into()));
        self
    }

    /// # Errors
    /// `Validation` when an endpoint is missing or lacks a required
    /// placeholder.
    pub fn build(self) -> Result<JobEndpoints> {
        let start = self
            .start
            .ok_or_else(|| PingError::Validation(format!("No start endpoint for {}", self.kind)))?;
        let status = self
            .status
            .ok_or_else(|| PingError::Validation(format!("No status endpoint for {}", self.kind)))?;

        require(&status, ID)?;
        if let StartProtocol::Staged { init, add_locations, start } = &start {
            require(init, SOVID)?;
            require(add_locations, ID)?;
            require(start, ID)?;
        }

        Ok(JobEndpoints { kind: self.kind, start, status, status_query: self.status_query })
    }
}

fn require(template: &str, placeholder: &str) -> Result<()> {
    if template.contains(placeholder) {
        Ok(())
    } else {
        Err(PingError::Validation(format!("Endpoint {template} is missing {placeholder}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_expand_paths() {
        let reoutput = JobEndpoints::regenerate_output();
        assert_eq!(reoutput.status_path("su-1"), "/api/v1/sov/reoutput/su-1");
        match reoutput.start() {
            StartProtocol::Staged { init, add_locations, start } => {
                assert_eq!(with_sovid(init, "s-9"), "/api/v1/sov/s-9/reoutput");
                assert_eq!(
                    with_id(add_locations, "su-1"),
                    "/api/v1/sov/reoutput/su-1/add_locations"
                );
                assert_eq!(with_id(start, "su-1"), "/api/v1/sov/reoutput/su-1/start");
            }
            other => panic!("unexpected protocol {other:?}"),
        }

        let update = JobEndpoints::update();
        assert_eq!(update.status_path("u-2"), "/api/v1/sov/update/u-2");
        assert_eq!(JobEndpoints::parse_document().status_path("sov-1"), "/api/v1/sov/sov-1");
    }

    #[test]
    fn ids_are_percent_encoded() {
        assert_eq!(with_id("/api/v1/sov/{id}", "a b/c"), "/api/v1/sov/a%20b%2Fc");
    }

    #[test]
    fn builder_requires_placeholders() {
        let err = JobEndpoints::builder(JobKind::BulkEnhance)
            .json("/api/v2/enhance")
            .status("/api/v2/enhance/status")
            .build()
            .unwrap_err();
        assert!(matches!(err, PingError::Validation(_)));

        let endpoints = JobEndpoints::builder(JobKind::BulkEnhance)
            .json("/api/v2/enhance")
            .status("/api/v2/enhance/{id}")
            .status_param("verbose", "1")
            .build()
            .unwrap();
        assert_eq!(endpoints.status_path("x"), "/api/v2/enhance/x");
        assert_eq!(endpoints.status_query().len(), 1);
    }

    #[test]
    fn builder_requires_start() {
        let err = JobEndpoints::builder(JobKind::ParseDocument)
            .status("/api/v1/sov/{id}")
            .build()
            .unwrap_err();
        assert!(matches!(err, PingError::Validation(message) if message.contains("start")));
    }
}
