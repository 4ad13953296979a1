pub mod activity;
pub mod record;
pub mod review;
pub mod user;

pub use activity::{last_page, Activity, ActivityPage, ActivityType, SourceActivity, PAGE_SIZE};
pub use record::{CreateRecordRequest, Record, RecordCategory, UpdateRecordRequest};
pub use review::Review;
pub use user::{NewUser, User};

/// Current UTC time as a fixed-width RFC 3339 string.
///
/// Fixed width keeps lexicographic order equal to chronological order, which
/// the `ORDER BY created_at` queries rely on.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
