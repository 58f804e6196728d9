//! Ping Vision: submissions, workflow statuses, events and teams

use std::io::Write;
use std::sync::Arc;

use pingintel_core::{PollClock, SystemClock};
use pingintel_domain::{
    ActivityQuery, CursorPage, PingError, Result, SubmissionActivity, SubmissionCreated,
    SubmissionDetail, SubmissionEventsQuery, SubmissionOptions, Team, UploadFile, WorkflowStatus,
};
use serde_json::{json, Map, Value};
use tracing::info;

use super::submissions::{self, ReadinessPolicy, SUBMISSION_PATH};
use crate::api::ApiClient;
use crate::http::HttpRequest;
use crate::pagination::CursorPager;

const STATUS_PATH: &str = "/api/v1/submission-status";
const BULK_UPDATE_PATH: &str = "/api/v1/submission/bulkupdate";
const EVENTS_PATH: &str = "/api/v1/submission-events";
const TEAMS_PATH: &str = "/api/v1/user/teams";

/// Ping Vision API client
pub struct PingVisionClient {
    client: Arc<ApiClient>,
    clock: Arc<dyn PollClock>,
}

impl PingVisionClient {
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

    fn submission_path(pingid: &str) -> String {
        format!("{SUBMISSION_PATH}/{}", urlencoding::encode(pingid))
    }

    /// Upload documents as a new submission.
    pub fn create_submission(
        &self,
        files: Vec<UploadFile>,
        options: &SubmissionOptions,
    ) -> Result<SubmissionCreated> {
        submissions::create(&self.client, files, options.to_fields())
    }

    /// Full submission record, from `/api/v1/submission/{pingid}/history`.
    pub fn submission_detail(&self, pingid: &str) -> Result<SubmissionDetail> {
        let path = format!("{}/history", Self::submission_path(pingid));
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

    /// Relative URL of one submission document.
    pub fn document_url(&self, pingid: &str, filename: &str) -> String {
        submissions::document_path(pingid, filename)
    }

    pub fn download_document(&self, document_url: &str, writer: &mut dyn Write) -> Result<u64> {
        submissions::download_document(&self.client, document_url, writer)
    }

    /// Workflow statuses configured for `division`.
    pub fn list_submission_statuses(&self, division: &str) -> Result<Vec<WorkflowStatus>> {
        if division.trim().is_empty() {
            return Err(PingError::Validation("A division is required.".into()));
        }
        self.client.get_json(STATUS_PATH, vec![("division".into(), division.to_string())])
    }

    /// Move a submission to another workflow status.
    pub fn change_status(&self, pingid: &str, workflow_status_uuid: &str) -> Result<Value> {
        let path = format!("{}/change_status", Self::submission_path(pingid));
        let value =
            self.client.patch_json(&path, json!({ "workflow_status_uuid": workflow_status_uuid }))?;
        info!(pingid, workflow_status_uuid, "Submission status changed");
        Ok(value)
    }

    /// Apply the same `changes` to several submissions.
    pub fn bulk_update(&self, ids: &[String], changes: Map<String, Value>) -> Result<Value> {
        if ids.is_empty() {
            return Err(PingError::Validation("At least one submission id is required.".into()));
        }
        self.client.post_json(BULK_UPDATE_PATH, json!({ "ids": ids, "changes": changes }))
    }

    pub fn update_submission(&self, pingid: &str, changes: Map<String, Value>) -> Result<Value> {
        self.client.patch_json(&Self::submission_path(pingid), Value::Object(changes))
    }

    /// One page of the submission events feed.
    pub fn list_events(&self, query: &SubmissionEventsQuery) -> Result<CursorPage<Value>> {
        self.client.get_json(EVENTS_PATH, query.to_params())
    }

    pub fn event_pages<'a>(
        &'a self,
        query: &'a SubmissionEventsQuery,
    ) -> impl Iterator<Item = Result<CursorPage<Value>>> + 'a {
        CursorPager::new(move |cursor: Option<&str>| match cursor {
            Some(cursor) => self.list_events(&query.at_cursor(cursor)),
            None => self.list_events(query),
        })
    }

    pub fn list_teams(&self) -> Result<Vec<Team>> {
        self.client.get_json(TEAMS_PATH, Vec::new())
    }

    /// Post data items under `action` (for example `add_locations`). The
    /// server answers without a body.
    pub fn add_data_items(
        &self,
        pingid: &str,
        action: &str,
        items: Map<String, Value>,
    ) -> Result<()> {
        if action.trim().is_empty() {
            return Err(PingError::Validation("An action is required.".into()));
        }
        let path = format!("{}/{}", Self::submission_path(pingid), urlencoding::encode(action));
        self.client.send(&HttpRequest::post(self.client.url(&path)).json(Value::Object(items)))?;
        Ok(())
    }

    /// Poll the submission until its workflow status is `completed`.
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
