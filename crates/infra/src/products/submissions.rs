//! Submission endpoints shared by Ping Vision and Ping Radar

use std::io::Write;
use std::time::Duration;

use pingintel_core::{poll_until, PollClock, PollPolicy};
use pingintel_domain::constants::SUBMISSION_POLL_INTERVAL_MS;
use pingintel_domain::{
    ActivityQuery, CursorPage, PingError, Result, SubmissionActivity, SubmissionCreated,
    SubmissionDetail, UploadFile,
};
use tracing::info;

use crate::api::ApiClient;
use crate::errors::InfraError;
use crate::http::MultipartBody;

pub(crate) const SUBMISSION_PATH: &str = "/api/v1/submission";

/// How long to wait for a new submission to finish processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub interval: Duration,
    pub timeout: Option<Duration>,
}

impl ReadinessPolicy {
    /// Same deadline and transient-retry rules as job polling.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::every(self.interval).with_timeout(self.timeout)
    }
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(SUBMISSION_POLL_INTERVAL_MS),
            timeout: None,
        }
    }
}

pub(crate) fn create(
    client: &ApiClient,
    files: Vec<UploadFile>,
    fields: Vec<(&'static str, String)>,
) -> Result<SubmissionCreated> {
    if files.is_empty() {
        return Err(PingError::Validation("At least one file is required.".into()));
    }
    let mut body =
        files.into_iter().fold(MultipartBody::new(), |body, file| body.file("files", file));
    for (name, value) in fields {
        body = body.text(name, value);
    }
    let created: SubmissionCreated = client.post_multipart(SUBMISSION_PATH, body)?;
    info!(pingid = %created.id, product = client.spec().product, "Submission created");
    Ok(created)
}

pub(crate) fn activity(
    client: &ApiClient,
    query: &ActivityQuery,
) -> Result<CursorPage<SubmissionActivity>> {
    client.get_json(SUBMISSION_PATH, query.to_params())
}

/// `/api/v1/submission/{pingid}/document/{filename}`
pub(crate) fn document_path(pingid: &str, filename: &str) -> String {
    format!(
        "{SUBMISSION_PATH}/{}/document/{}",
        urlencoding::encode(pingid),
        urlencoding::encode(filename)
    )
}

/// Documents are only fetched from the client's own API.
pub(crate) fn download_document(
    client: &ApiClient,
    document_url: &str,
    writer: &mut dyn Write,
) -> Result<u64> {
    let on_api = document_url.starts_with('/')
        || document_url.starts_with(&format!("{}/", client.api_url()));
    if !on_api {
        return Err(PingError::Validation(format!(
            "Document URL should start with {} or / but got {document_url}",
            client.api_url()
        )));
    }
    let mut response = client.download(document_url)?;
    let bytes = response.copy_to(writer).map_err(InfraError::from)?;
    info!(url = %document_url, bytes, "Downloaded document");
    Ok(bytes)
}

/// Fetch the detail until it reports ready.
pub(crate) fn wait_until_ready<F, G>(
    clock: &dyn PollClock,
    policy: &ReadinessPolicy,
    pingid: &str,
    fetch: F,
    mut on_detail: G,
) -> Result<SubmissionDetail>
where
    F: FnMut() -> Result<SubmissionDetail>,
    G: FnMut(&SubmissionDetail),
{
    poll_until(
        clock,
        &policy.poll_policy(),
        pingid,
        fetch,
        SubmissionDetail::is_ready,
        |detail| {
            on_detail(detail);
            if !detail.is_ready() {
                info!(
                    pingid,
                    workflow_status = detail.workflow_status.as_deref().unwrap_or("unknown"),
                    "Submission not ready"
                );
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Instant;

    use serde_json::json;

    use super::*;

    struct StepClock {
        base: Instant,
        offset: Mutex<Duration>,
    }

    impl PollClock for StepClock {
        fn now(&self) -> Instant {
            self.base + *self.offset.lock().unwrap()
        }

        fn sleep(&self, duration: Duration) {
            *self.offset.lock().unwrap() += duration;
        }
    }

    fn detail(status: &str) -> SubmissionDetail {
        serde_json::from_value(json!({"id": "p-1", "workflow_status": status})).unwrap()
    }

    #[test]
    fn document_path_encodes_filename() {
        assert_eq!(
            document_path("p-1", "loss runs 2024.pdf"),
            "/api/v1/submission/p-1/document/loss%20runs%202024.pdf"
        );
    }

    #[test]
    fn waits_for_completed_status() {
        let clock = StepClock { base: Instant::now(), offset: Mutex::new(Duration::ZERO) };
        let mut statuses = vec!["completed", "in_progress", "new"];
        let mut seen = 0;

        let ready = wait_until_ready(
            &clock,
            &ReadinessPolicy::default(),
            "p-1",
            || Ok(detail(statuses.pop().unwrap_or("completed"))),
            |_| seen += 1,
        )
        .unwrap();

        assert!(ready.is_ready());
        assert_eq!(seen, 3);
        assert_eq!(clock.now() - clock.base, Duration::from_secs(2));
    }

    #[test]
    fn last_wait_is_clipped_to_timeout() {
        let clock = StepClock { base: Instant::now(), offset: Mutex::new(Duration::ZERO) };
        let policy = ReadinessPolicy {
            interval: Duration::from_secs(1),
            timeout: Some(Duration::from_millis(2_500)),
        };
        let mut fetches = 0;

        let err = wait_until_ready(
            &clock,
            &policy,
            "p-1",
            || {
                fetches += 1;
                Ok(detail("new"))
            },
            |_| {},
        )
        .unwrap_err();

        assert_eq!(
            err,
            PingError::Timeout { job_id: "p-1".into(), elapsed: Duration::from_millis(2_500) }
        );
        assert_eq!(fetches, 3);
    }

    #[test]
    fn gives_up_after_timeout() {
        let clock = StepClock { base: Instant::now(), offset: Mutex::new(Duration::ZERO) };
        let policy = ReadinessPolicy {
            interval: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(2)),
        };

        let err =
            wait_until_ready(&clock, &policy, "p-1", || Ok(detail("new")), |_| {}).unwrap_err();
        assert!(matches!(err, PingError::Timeout { ref job_id, .. } if job_id == "p-1"));
    }
}
