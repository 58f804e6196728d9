//! SOV Fixer: document parsing, activity, output regeneration and updates

use std::sync::Arc;

use pingintel_core::{JobPoller, PollClock, PollPolicy, SystemClock};
use pingintel_domain::{
    ActivityQuery, CursorPage, Job, JobInput, JobKind, JobOptions, JobResult, JobSnapshot,
    PingError, Result, SovActivity, UploadFile,
};

use crate::api::ApiClient;
use crate::jobs::{JobEndpoints, RemoteJobBackend};
use crate::output::OutputFetcher;
use crate::pagination::CursorPager;

const ACTIVITY_PATH: &str = "/api/v1/sov/activity";

/// SOV Fixer API client
pub struct SovFixerClient {
    client: Arc<ApiClient>,
    clock: Arc<dyn PollClock>,
}

impl SovFixerClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client: Arc::new(client), clock: Arc::new(SystemClock) }
    }

    /// Replace the clock used while polling
    pub fn with_clock(mut self, clock: Arc<dyn PollClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.client
    }

    fn poller(&self, endpoints: JobEndpoints) -> JobPoller {
        let backend = RemoteJobBackend::new(Arc::clone(&self.client), endpoints);
        JobPoller::new(Arc::new(backend)).with_clock(Arc::clone(&self.clock))
    }

    fn policy(&self, kind: JobKind, policy: Option<PollPolicy>) -> PollPolicy {
        policy.unwrap_or_else(|| self.client.poll_policy(kind))
    }

    /// Upload documents for parsing; returns without waiting.
    pub fn fix_sov_start(&self, files: Vec<UploadFile>, options: &JobOptions) -> Result<Job> {
        self.poller(JobEndpoints::parse_document()).start(&JobInput::Files(files), options)
    }

    pub fn fix_sov_status(&self, sov_id: &str) -> Result<JobSnapshot> {
        self.poller(JobEndpoints::parse_document()).poll_once(sov_id)
    }

    /// Upload, then poll until the parse finishes.
    pub fn fix_sov<F>(
        &self,
        files: Vec<UploadFile>,
        options: &JobOptions,
        policy: Option<PollPolicy>,
        on_progress: F,
    ) -> Result<JobResult>
    where
        F: FnMut(&JobSnapshot),
    {
        let poller = self.poller(JobEndpoints::parse_document());
        let job = poller.start(&JobInput::Files(files), options)?;
        poller.run_with_progress(&job, &self.policy(JobKind::ParseDocument, policy), on_progress)
    }

    /// Resume waiting on a job started earlier.
    pub fn wait_for(&self, job: &Job, policy: Option<PollPolicy>) -> Result<JobResult> {
        let endpoints = match job.kind {
            JobKind::ParseDocument => JobEndpoints::parse_document(),
            JobKind::RegenerateOutput => JobEndpoints::regenerate_output(),
            JobKind::Update => JobEndpoints::update(),
            JobKind::BulkEnhance => {
                return Err(PingError::Validation(
                    "Bulk enhance jobs run on Ping Data; wait on them with PingDataClient.".into(),
                ));
            }
        };
        self.poller(endpoints).run_to_completion(job, &self.policy(job.kind, policy))
    }

    /// One page of the SOV activity listing.
    pub fn list_activity(&self, query: &ActivityQuery) -> Result<CursorPage<SovActivity>> {
        self.client.get_json(ACTIVITY_PATH, query.to_params())
    }

    /// Every page of the activity listing, starting at `query`'s cursor.
    pub fn activity_pages<'a>(
        &'a self,
        query: &'a ActivityQuery,
    ) -> impl Iterator<Item = Result<CursorPage<SovActivity>>> + 'a {
        CursorPager::new(move |cursor: Option<&str>| match cursor {
            Some(cursor) => self.list_activity(&query.at_cursor(cursor)),
            None => self.list_activity(query),
        })
    }

    /// Open a regeneration session for `sovid`, upload the location files and
    /// start it.
    pub fn reoutput_start(
        &self,
        sovid: &str,
        location_files: Vec<UploadFile>,
        options: &JobOptions,
    ) -> Result<Job> {
        let input = JobInput::Revision { source_id: sovid.to_string(), location_files };
        self.poller(JobEndpoints::regenerate_output()).start(&input, options)
    }

    pub fn reoutput_status(&self, session_id: &str) -> Result<JobSnapshot> {
        self.poller(JobEndpoints::regenerate_output()).poll_once(session_id)
    }

    pub fn reoutput<F>(
        &self,
        sovid: &str,
        location_files: Vec<UploadFile>,
        options: &JobOptions,
        policy: Option<PollPolicy>,
        on_progress: F,
    ) -> Result<JobResult>
    where
        F: FnMut(&JobSnapshot),
    {
        let poller = self.poller(JobEndpoints::regenerate_output());
        let input = JobInput::Revision { source_id: sovid.to_string(), location_files };
        let job = poller.start(&input, options)?;
        let policy = self.policy(JobKind::RegenerateOutput, policy);
        poller.run_with_progress(&job, &policy, on_progress)
    }

    /// Start an update of `sovid`; `metadata` and other extras travel in
    /// `options.extra`.
    pub fn update_start(
        &self,
        sovid: &str,
        location_files: Vec<UploadFile>,
        options: &JobOptions,
    ) -> Result<Job> {
        let input = JobInput::Revision { source_id: sovid.to_string(), location_files };
        self.poller(JobEndpoints::update()).start(&input, options)
    }

    pub fn update_status(&self, session_id: &str) -> Result<JobSnapshot> {
        self.poller(JobEndpoints::update()).poll_once(session_id)
    }

    pub fn update<F>(
        &self,
        sovid: &str,
        location_files: Vec<UploadFile>,
        options: &JobOptions,
        policy: Option<PollPolicy>,
        on_progress: F,
    ) -> Result<JobResult>
    where
        F: FnMut(&JobSnapshot),
    {
        let poller = self.poller(JobEndpoints::update());
        let input = JobInput::Revision { source_id: sovid.to_string(), location_files };
        let job = poller.start(&input, options)?;
        poller.run_with_progress(&job, &self.policy(JobKind::Update, policy), on_progress)
    }

    /// Downloader for the outputs of finished jobs.
    pub fn outputs(&self) -> OutputFetcher<'_> {
        OutputFetcher::new(&self.client)
    }
}
