//! Ping Data: synchronous enhancement and bulk enhancement jobs

use std::sync::Arc;

use pingintel_core::{JobPoller, PollClock, PollPolicy, SystemClock};
use pingintel_domain::{
    DataSource, EnhanceRequest, EnhanceResponse, Job, JobInput, JobKind, JobOptions, JobResult,
    JobSnapshot, LocationRecord, PingError, Result,
};

use crate::api::ApiClient;
use crate::http::HttpRequest;
use crate::jobs::{JobEndpoints, RemoteJobBackend};
use crate::output::OutputFetcher;

const ENHANCE_PATH: &str = "/api/v1/enhance";

/// Ping Data API client
pub struct PingDataClient {
    client: Arc<ApiClient>,
    clock: Arc<dyn PollClock>,
}

impl PingDataClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client: Arc::new(client), clock: Arc::new(SystemClock) }
    }

    pub fn with_clock(mut self, clock: Arc<dyn PollClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.client
    }

    fn poller(&self) -> JobPoller {
        let backend =
            RemoteJobBackend::new(Arc::clone(&self.client), JobEndpoints::bulk_enhance());
        JobPoller::new(Arc::new(backend)).with_clock(Arc::clone(&self.clock))
    }

    /// Enhance addresses synchronously.
    ///
    /// `request.timeout` bounds the server-side work; the HTTP request itself
    /// is given the same budget plus a grace second.
    pub fn enhance(&self, request: &EnhanceRequest) -> Result<EnhanceResponse> {
        if request.addresses.is_empty() {
            return Err(PingError::Validation("At least one address is required.".into()));
        }
        if request.sources.is_empty() {
            return Err(PingError::Validation("At least one data source is required.".into()));
        }
        let mut http = HttpRequest::get(self.client.url(ENHANCE_PATH)).query(request.to_params());
        if let Some(timeout) = request.timeout.filter(|secs| secs.is_finite() && *secs > 0.0) {
            http = http.timeout(std::time::Duration::from_secs_f64(timeout + 1.0));
        }
        crate::api::decode_json(self.client.send(&http)?)
    }

    pub fn bulk_enhance_start(
        &self,
        records: Vec<LocationRecord>,
        sources: Vec<DataSource>,
        options: &JobOptions,
    ) -> Result<Job> {
        self.poller().start(&JobInput::Locations { records, sources }, options)
    }

    pub fn bulk_enhance_status(&self, job_id: &str) -> Result<JobSnapshot> {
        self.poller().poll_once(job_id)
    }

    pub fn bulk_enhance<F>(
        &self,
        records: Vec<LocationRecord>,
        sources: Vec<DataSource>,
        options: &JobOptions,
        policy: Option<PollPolicy>,
        on_progress: F,
    ) -> Result<JobResult>
    where
        F: FnMut(&JobSnapshot),
    {
        let poller = self.poller();
        let job = poller.start(&JobInput::Locations { records, sources }, options)?;
        let policy = policy.unwrap_or_else(|| self.client.poll_policy(JobKind::BulkEnhance));
        poller.run_with_progress(&job, &policy, on_progress)
    }

    pub fn outputs(&self) -> OutputFetcher<'_> {
        OutputFetcher::new(&self.client)
    }
}
