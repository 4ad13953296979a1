use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RecordCategory {
    OnCampus,
    Extracurricular,
    Volunteer,
    Certificate,
    Other,
}

/// A personal activity log entry.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: i64,
    pub category: RecordCategory,
    pub title: String,
    pub content: String,
    #[serde(rename = "start")]
    pub start_date: String,
    #[serde(rename = "end")]
    pub end_date: String,
    pub impression: Option<String>,
    pub author_email: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateRecordRequest {
    pub category: RecordCategory,
    pub title: String,
    pub content: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub impression: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdateRecordRequest {
    #[serde(default)]
    pub category: Option<RecordCategory>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub impression: Option<String>,
}
