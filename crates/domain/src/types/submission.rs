//! Submission contracts shared by Ping Vision and Ping Radar

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::activity::QueryParams;

/// Acknowledgement of a new submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionCreated {
    pub id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// A document attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionDocument {
    #[serde(default)]
    pub document_type: Option<String>,
    pub filename: String,
    #[serde(default)]
    pub processing_status: Option<String>,
    pub url: String,
    #[serde(default)]
    pub created_time: Option<String>,
}

/// Submission detail. Only the readiness fields are typed; everything else
/// is kept as returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDetail {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub workflow_status: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SubmissionDetail {
    /// Processing has finished once the workflow status reads `completed`.
    pub fn is_ready(&self) -> bool {
        self.workflow_status.as_deref() == Some(READY_WORKFLOW_STATUS)
    }
}

/// Workflow status of a fully processed submission
pub const READY_WORKFLOW_STATUS: &str = "completed";

/// A row of the submission activity listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionActivity {
    pub id: String,
    #[serde(default)]
    pub pk: Option<i64>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
    #[serde(default, rename = "company__name")]
    pub company_name: Option<String>,
    #[serde(default, rename = "company__short_name")]
    pub company_short_name: Option<String>,
    #[serde(default, rename = "division__name")]
    pub division_name: Option<String>,
    #[serde(default, rename = "division__short_name")]
    pub division_short_name: Option<String>,
    #[serde(default)]
    pub division_id: Option<i64>,
    #[serde(default, rename = "team__name")]
    pub team_name: Option<String>,
    #[serde(default, rename = "workflow_status__name")]
    pub workflow_status_name: Option<String>,
    #[serde(default)]
    pub workflow_status_id: Option<i64>,
    #[serde(default)]
    pub claimed_by_id: Option<String>,
    #[serde(default, rename = "source__source_type")]
    pub source_type: Option<String>,
    #[serde(default)]
    pub documents: Vec<SubmissionDocument>,
    #[serde(default)]
    pub actions: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Optional fields sent with a new Ping Vision submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionOptions {
    pub client_ref: Option<String>,
    pub insured_name: Option<String>,
    pub team_uuid: Option<String>,
    pub inception_date: Option<chrono::NaiveDate>,
    pub expiration_date: Option<chrono::NaiveDate>,
    pub delegate_to_team: Option<String>,
}

impl SubmissionOptions {
    /// Multipart text fields, dates in ISO-8601.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        let text = [
            ("client_ref", &self.client_ref),
            ("insured_name", &self.insured_name),
            ("team_uuid", &self.team_uuid),
        ];
        for (name, value) in text {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                fields.push((name, value.to_string()));
            }
        }
        if let Some(date) = self.inception_date {
            fields.push(("inception_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.expiration_date {
            fields.push(("expiration_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(team) = self.delegate_to_team.as_deref().filter(|v| !v.is_empty()) {
            fields.push(("delegate_to_team", team.to_string()));
        }
        fields
    }
}

/// A workflow status available in a division.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A team the authenticated user belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default, alias = "team_name")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filters for the submission events feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionEventsQuery {
    pub pingid: Option<String>,
    pub division: Option<String>,
    pub team: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub cursor_id: Option<String>,
    pub page_size: Option<u32>,
}

impl SubmissionEventsQuery {
    pub fn at_cursor(&self, cursor_id: &str) -> Self {
        Self { cursor_id: Some(cursor_id.to_string()), ..self.clone() }
    }

    /// Query string; `start` is rendered as `YYYYmmddHHMMSS`.
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        let text = [
            ("pingid", &self.pingid),
            ("division", &self.division),
            ("team", &self.team),
        ];
        for (key, value) in text {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                params.push((key.to_string(), value.to_string()));
            }
        }
        if let Some(start) = self.start {
            params.push(("start".to_string(), start.format("%Y%m%d%H%M%S").to_string()));
        }
        if let Some(cursor) = self.cursor_id.as_deref().filter(|v| !v.is_empty()) {
            params.push(("cursor_id".to_string(), cursor.to_string()));
        }
        if let Some(page_size) = self.page_size.filter(|size| *size > 0) {
            params.push(("page_size".to_string(), page_size.to_string()));
        }
        params
    }
}
