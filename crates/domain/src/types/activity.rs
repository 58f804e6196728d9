//! Activity listings and cursor pagination

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::impl_domain_status_conversions;

/// Query string pairs; list values appear once per element.
pub type QueryParams = Vec<(String, String)>;

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub cursor_id: Option<String>,
    #[serde(default)]
    pub prev_cursor_id: Option<String>,
    #[serde(default)]
    pub remaining_count: Option<u64>,
}

impl<T> CursorPage<T> {
    /// Cursor of the following page, if the listing continues.
    pub fn next_cursor(&self) -> Option<&str> {
        if self.results.is_empty() {
            return None;
        }
        self.cursor_id.as_deref().filter(|cursor| !cursor.is_empty())
    }
}

/// How a SOV reached the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActivityOrigin {
    Api,
    Email,
}

impl_domain_status_conversions!(ActivityOrigin {
    Api => "api",
    Email => "email",
});

/// Single-letter status filter of the SOV activity listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActivityStatus {
    Pending,
    InProgress,
    Enriching,
    Reenriching,
    Complete,
    Failed,
}

impl_domain_status_conversions!(ActivityStatus {
    Pending => "P",
    InProgress => "I",
    Enriching => "E",
    Reenriching => "R",
    Complete => "C",
    Failed => "F",
});

/// Filters for the activity listings of SOV Fixer, Ping Vision and Ping Radar.
///
/// `origin` and `status` are only understood by SOV Fixer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityQuery {
    pub id: Option<String>,
    pub cursor_id: Option<String>,
    pub prev_cursor_id: Option<String>,
    pub page_size: Option<u32>,
    pub fields: Vec<String>,
    pub search: Option<String>,
    pub origin: Option<ActivityOrigin>,
    pub status: Option<ActivityStatus>,
    pub organization_short_name: Option<String>,
}

impl ActivityQuery {
    /// Same filters, positioned at another cursor.
    pub fn at_cursor(&self, cursor_id: &str) -> Self {
        Self { cursor_id: Some(cursor_id.to_string()), prev_cursor_id: None, ..self.clone() }
    }

    /// Query string for the request. A forward cursor wins over a backward one.
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        let mut push = |key: &str, value: String| params.push((key.to_string(), value));

        if let Some(id) = non_empty(&self.id) {
            push("id", id.to_string());
        }
        if let Some(cursor) = non_empty(&self.cursor_id) {
            push("cursor_id", cursor.to_string());
        } else if let Some(cursor) = non_empty(&self.prev_cursor_id) {
            push("prev_cursor_id", cursor.to_string());
        }
        if let Some(page_size) = self.page_size.filter(|size| *size > 0) {
            push("page_size", page_size.to_string());
        }
        for field in &self.fields {
            push("fields", field.clone());
        }
        if let Some(search) = non_empty(&self.search) {
            push("search", search.to_string());
        }
        if let Some(origin) = self.origin {
            push("origin", origin.to_string());
        }
        if let Some(status) = self.status {
            push("status", status.to_string());
        }
        if let Some(org) = non_empty(&self.organization_short_name) {
            push("organization__short_name", org.to_string());
        }
        params
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// A row of the SOV Fixer activity listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SovActivity {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}
