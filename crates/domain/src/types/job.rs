//! Remote job lifecycle: the job handle, its status vocabulary, progress
//! snapshots and the final result.

use serde::{Deserialize, Serialize};

use crate::errors::{PingError, Result};
use crate::impl_domain_status_conversions;

/// Kind of long-running server-side job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JobKind {
    ParseDocument,
    BulkEnhance,
    RegenerateOutput,
    Update,
}

impl_domain_status_conversions!(JobKind {
    ParseDocument => "parse_document",
    BulkEnhance => "bulk_enhance",
    RegenerateOutput => "regenerate_output",
    Update => "update",
});

/// Status reported by the server for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Queued,
    InProgress,
    Enriching,
    Reenriching,
    Complete,
    Failed,
}

impl_domain_status_conversions!(JobStatus {
    Pending => "PENDING",
    Queued => "QUEUED",
    InProgress => "IN_PROGRESS",
    Enriching => "ENRICHING",
    Reenriching => "REENRICHING",
    Complete => "COMPLETE",
    Failed => "FAILED",
});

impl JobStatus {
    /// Terminal statuses never change once observed.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

/// Outcome classification carried by a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResultStatus {
    Success,
    FailedToRead,
    FailedToParse,
    FailedToProcess,
    Failed,
}

impl_domain_status_conversions!(ResultStatus {
    Success => "SUCCESS",
    FailedToRead => "FAILED_TO_READ",
    FailedToParse => "FAILED_TO_PARSE",
    FailedToProcess => "FAILED_TO_PROCESS",
    Failed => "FAILED",
});

/// Handle to a job accepted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub kind: JobKind,
    /// Message returned with the start acknowledgement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Start acknowledgement as sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartJobResponse {
    pub id: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl StartJobResponse {
    pub fn into_job(self, kind: JobKind) -> Job {
        Job { id: self.id, kind, message: self.message }
    }
}

/// A downloadable output produced by a finished job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
    pub url: String,
    #[serde(alias = "scrubbed_filename")]
    pub filename: String,
    #[serde(default, alias = "label")]
    pub description: String,
}

/// Result payload of a finished job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub status: ResultStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub outputs: Vec<OutputArtifact>,
}

/// The `request` half of a status response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    pub status: JobStatus,
    #[serde(default)]
    pub pct_complete: Option<f64>,
    #[serde(default)]
    pub last_health_status: Option<String>,
    #[serde(default)]
    pub requested_at: Option<String>,
    #[serde(default)]
    pub progress_started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub last_health_check_time: Option<String>,
}

/// Status response body: `{"request": {...}, "result": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub request: JobProgress,
    #[serde(default)]
    pub result: Option<JobOutcome>,
}

/// Point-in-time view of a job, produced by one status fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub job_id: String,
    #[serde(flatten)]
    pub progress: JobProgress,
    pub result: Option<JobOutcome>,
}

impl JobSnapshot {
    /// Builds a snapshot from a status response.
    ///
    /// # Errors
    /// Returns [`PingError::InvalidResponse`] when the job reports `COMPLETE`
    /// without a result payload.
    pub fn from_response(job_id: impl Into<String>, response: JobStatusResponse) -> Result<Self> {
        let job_id = job_id.into();
        if response.request.status == JobStatus::Complete && response.result.is_none() {
            return Err(PingError::InvalidResponse(format!(
                "job {job_id} is COMPLETE but carries no result"
            )));
        }
        Ok(Self { job_id, progress: response.request, result: response.result })
    }

    pub fn status(&self) -> JobStatus {
        self.progress.status
    }

    pub fn is_terminal(&self) -> bool {
        self.progress.status.is_terminal()
    }

    /// One-line progress description for logs and the CLI.
    pub fn describe(&self) -> String {
        match (self.progress.pct_complete, self.progress.last_health_status.as_deref()) {
            (Some(pct), Some(health)) => format!("{} ({pct}% complete): {health}", self.status()),
            (Some(pct), None) => format!("{} ({pct}% complete)", self.status()),
            (None, Some(health)) => format!("{}: {health}", self.status()),
            (None, None) => self.status().to_string(),
        }
    }
}

/// Final state of a job driven to a terminal status.
///
/// Failure is data, not an error: a `FAILED` job or a `COMPLETE` job whose
/// outcome is not `SUCCESS` yields `is_success() == false`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobResult {
    pub job: Job,
    pub snapshot: JobSnapshot,
}

impl JobResult {
    pub fn new(job: Job, snapshot: JobSnapshot) -> Self {
        Self { job, snapshot }
    }

    pub fn status(&self) -> JobStatus {
        self.snapshot.status()
    }

    pub fn outcome(&self) -> Option<&JobOutcome> {
        self.snapshot.result.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.status() == JobStatus::Complete
            && self.outcome().is_some_and(|outcome| outcome.status == ResultStatus::Success)
    }

    /// Outputs of the job; empty unless the outcome lists any.
    pub fn outputs(&self) -> &[OutputArtifact] {
        self.outcome().map(|outcome| outcome.outputs.as_slice()).unwrap_or_default()
    }

    pub fn message(&self) -> &str {
        self.outcome()
            .map(|outcome| outcome.message.as_str())
            .or(self.snapshot.progress.last_health_status.as_deref())
            .unwrap_or_default()
    }

    /// Converts an unsuccessful result into [`PingError::JobFailed`].
    ///
    /// # Errors
    /// Returns `JobFailed` unless [`JobResult::is_success`] holds.
    pub fn into_success(self) -> Result<JobOutcome> {
        if !self.is_success() {
            let status =
                self.outcome().map_or_else(|| self.status().to_string(), |o| o.status.to_string());
            return Err(PingError::JobFailed {
                job_id: self.job.id.clone(),
                status,
                message: self.message().to_string(),
            });
        }
        self.snapshot.result.ok_or_else(|| {
            PingError::InvalidResponse(format!("job {} has no result", self.job.id))
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(value: serde_json::Value) -> JobStatusResponse {
        serde_json::from_value(value).unwrap()
    }

    fn job() -> Job {
        Job { id: "sov-1".into(), kind: JobKind::ParseDocument, message: None }
    }

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!("in_progress".parse::<JobStatus>().unwrap(), JobStatus::InProgress);
        assert_eq!("Queued".parse::<JobStatus>().unwrap(), JobStatus::Queued);
        assert!("DONE".parse::<JobStatus>().is_err());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Reenriching.is_terminal());
    }

    #[test]
    fn unknown_status_is_rejected_at_the_boundary() {
        let err = serde_json::from_value::<JobStatusResponse>(json!({
            "request": {"status": "EXPLODED"}
        }));
        assert!(err.is_err());
    }

    #[test]
    fn artifact_accepts_legacy_aliases() {
        let artifact: OutputArtifact = serde_json::from_value(json!({
            "url": "/api/v1/sov/sov-1/output/a.xlsx",
            "scrubbed_filename": "a.xlsx",
            "label": "Scrubbed SOV"
        }))
        .unwrap();
        assert_eq!(artifact.filename, "a.xlsx");
        assert_eq!(artifact.description, "Scrubbed SOV");
    }

    #[test]
    fn complete_without_result_is_a_protocol_violation() {
        let err = JobSnapshot::from_response("sov-1", response(json!({
            "request": {"status": "COMPLETE"}
        })))
        .unwrap_err();
        assert!(matches!(err, PingError::InvalidResponse(_)));
    }

    #[test]
    fn successful_result_exposes_outputs() {
        let snapshot = JobSnapshot::from_response("sov-1", response(json!({
            "request": {"status": "COMPLETE", "pct_complete": 100},
            "result": {
                "status": "SUCCESS",
                "message": "ok",
                "outputs": [
                    {"url": "/o/a.json", "filename": "a.json", "description": "JSON"},
                    {"url": "/o/b.xlsx", "filename": "b.xlsx", "description": "Excel"}
                ]
            }
        })))
        .unwrap();
        let result = JobResult::new(job(), snapshot);
        assert!(result.is_success());
        assert_eq!(result.outputs().len(), 2);
        assert_eq!(result.into_success().unwrap().outputs[1].filename, "b.xlsx");
    }

    #[test]
    fn failed_result_converts_to_job_failed() {
        let snapshot = JobSnapshot::from_response("sov-1", response(json!({
            "request": {"status": "COMPLETE"},
            "result": {"status": "FAILED_TO_PARSE", "message": "bad sheet", "outputs": []}
        })))
        .unwrap();
        let result = JobResult::new(job(), snapshot);
        assert!(!result.is_success());
        assert_eq!(
            result.into_success().unwrap_err(),
            PingError::JobFailed {
                job_id: "sov-1".into(),
                status: "FAILED_TO_PARSE".into(),
                message: "bad sheet".into(),
            }
        );
    }

    #[test]
    fn failed_status_without_result_is_not_success() {
        let snapshot = JobSnapshot::from_response("sov-1", response(json!({
            "request": {"status": "FAILED", "last_health_status": "worker died"}
        })))
        .unwrap();
        let result = JobResult::new(job(), snapshot);
        assert!(!result.is_success());
        assert!(result.outputs().is_empty());
        assert_eq!(result.message(), "worker died");
    }

    #[test]
    fn describe_includes_progress() {
        let snapshot = JobSnapshot::from_response("sov-1", response(json!({
            "request": {
                "status": "IN_PROGRESS",
                "pct_complete": 50,
                "last_health_status": "reading"
            }
        })))
        .unwrap();
        assert_eq!(snapshot.describe(), "IN_PROGRESS (50% complete): reading");
    }
}
