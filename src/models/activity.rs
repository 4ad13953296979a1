use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Rows per listing page.
pub const PAGE_SIZE: i64 = 10;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ActivityType {
    /// Student clubs.
    Club,
    /// Programs run by outside organizations.
    External,
    /// Competitions and contests.
    Contest,
}

impl ActivityType {
    pub const ALL: [ActivityType; 3] = [
        ActivityType::Club,
        ActivityType::External,
        ActivityType::Contest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Club => "club",
            ActivityType::External => "external",
            ActivityType::Contest => "contest",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown activity type: {0}")]
pub struct UnknownActivityType(pub String);

impl FromStr for ActivityType {
    type Err = UnknownActivityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "club" => Ok(ActivityType::Club),
            "external" => Ok(ActivityType::External),
            "contest" => Ok(ActivityType::Contest),
            _ => Err(UnknownActivityType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub act_type: ActivityType,
    pub title: String,
    pub dday: Option<String>,
    pub company: Option<String>,
    pub link: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Activity {
    /// Builds a new row from a provider item with a freshly generated id.
    pub fn from_source(item: SourceActivity, act_type: ActivityType, now: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            act_type,
            title: item.title,
            dday: item.dday,
            company: item.company,
            link: item.link,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

/// An activity as returned by the external provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceActivity {
    #[serde(default)]
    pub act_type: Option<ActivityType>,
    pub title: String,
    #[serde(default)]
    pub dday: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPage {
    pub data: Vec<Activity>,
    pub total: i64,
    pub last_page: i64,
}

impl ActivityPage {
    pub fn new(data: Vec<Activity>, total: i64) -> Self {
        Self {
            data,
            total,
            last_page: last_page(total),
        }
    }
}

/// `ceil(total / PAGE_SIZE)`; zero rows means zero pages.
pub fn last_page(total: i64) -> i64 {
    if total <= 0 {
        0
    } else {
        (total + PAGE_SIZE - 1) / PAGE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page() {
        assert_eq!(last_page(0), 0);
        assert_eq!(last_page(1), 1);
        assert_eq!(last_page(10), 1);
        assert_eq!(last_page(11), 2);
        assert_eq!(last_page(25), 3);
    }

    #[test]
    fn test_activity_type_parsing() {
        assert_eq!("club".parse::<ActivityType>(), Ok(ActivityType::Club));
        assert_eq!(" Contest ".parse::<ActivityType>(), Ok(ActivityType::Contest));
        assert!("sports".parse::<ActivityType>().is_err());
    }

    #[test]
    fn test_source_item_with_missing_optionals() {
        let item: SourceActivity =
            serde_json::from_str(r#"{"title": "Robotics club"}"#).expect("valid payload");
        let activity = Activity::from_source(item, ActivityType::Club, "2025-03-01T00:00:00Z");

        assert_eq!(activity.title, "Robotics club");
        assert_eq!(activity.act_type, ActivityType::Club);
        assert!(activity.company.is_none());
        assert!(Uuid::parse_str(&activity.id).is_ok());
    }

    #[test]
    fn test_activity_serializes_camel_case() {
        let activity = Activity {
            id: "a".into(),
            act_type: ActivityType::External,
            title: "t".into(),
            dday: Some("D-3".into()),
            company: None,
            link: None,
            created_at: "c".into(),
            updated_at: "u".into(),
        };
        let value = serde_json::to_value(&activity).expect("serializable");
        assert_eq!(value["actType"], "external");
        assert_eq!(value["createdAt"], "c");
    }
}
