//! Ping Radar submissions

use std::io::Write;
use std::sync::Arc;

use pingintel_core::{PollClock, SystemClock};
use pingintel_domain::{
    ActivityQuery, CursorPage, Result, SubmissionActivity, SubmissionCreated, SubmissionDetail,
    UploadFile,
};

use super::submissions::{self, ReadinessPolicy, SUBMISSION_PATH};
use crate::api::ApiClient;
use crate::pagination::CursorPager;

/// Ping Radar API client
pub struct PingRadarClient {
    client: Arc<ApiClient>,
    clock: Arc<dyn PollClock>,
}

impl PingRadarClient {
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

    pub fn create_submission(
        &self,
        files: Vec<UploadFile>,
        client_ref: Option<&str>,
    ) -> Result<SubmissionCreated> {
        let fields = client_ref
            .filter(|value| !value.is_empty())
            .map(|value| vec![("client_ref", value.to_string())])
            .unwrap_or_default();
        submissions::create(&self.client, files, fields)
    }

    pub fn submission_detail(&self, pingid: &str) -> Result<SubmissionDetail> {
        let path = format!("{SUBMISSION_PATH}/{}", urlencoding::encode(pingid));
        self.client.get_json(&path, Vec::new())
    }

    pub fn list_activity(&self, query: &ActivityQuery) -> Result<CursorPage<SubmissionActivity>> {
        submissions::activity(&self.client, query)
    }

    pub fn activity_pages<'a>(
        &'a self,
        query: &'a ActivityQuery,
    ) -> impl Iterator<Item = Result<CursorPage<SubmissionActivity>>> + 'a {
        CursorPager::new(move |cursor: Option<&str>| match cursor {
            Some(cursor) => self.list_activity(&query.at_cursor(cursor)),
            None => self.list_activity(query),
        })
    }

    pub fn document_url(&self, pingid: &str, filename: &str) -> String {
        submissions::document_path(pingid, filename)
    }

    pub fn download_document(&self, document_url: &str, writer: &mut dyn Write) -> Result<u64> {
        submissions::download_document(&self.client, document_url, writer)
    }

    pub fn wait_until_ready<F>(
        &self,
        pingid: &str,
        policy: &ReadinessPolicy,
        on_detail: F,
    ) -> Result<SubmissionDetail>
    where
        F: FnMut(&SubmissionDetail),
    {
        submissions::wait_until_ready(
            self.clock.as_ref(),
            policy,
            pingid,
            || self.submission_detail(pingid),
            on_detail,
        )
    }
}
