use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub univ: Option<String>,
    pub department: Option<String>,
    pub admission_date: Option<String>,
    pub expected_graduation_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile fields collected at sign-up, password already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub univ: Option<String>,
    pub department: Option<String>,
    pub admission_date: Option<String>,
    pub expected_graduation_date: Option<String>,
}
