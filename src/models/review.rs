use serde::Serialize;
use serde_json::Value;

/// A review fetched from the external provider for one activity.
///
/// `body` holds the provider's JSON object as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub activity_id: String,
    pub body: Value,
    pub created_at: String,
}
