use crate::cache::{self, CacheStore};
use crate::error::{AppError, Result};
use crate::models::{
    timestamp_now, Activity, ActivityPage, ActivityType, Review, SourceActivity, PAGE_SIZE,
};
use crate::repositories::{ActivityRepository, RepositoryError, ReviewRepository};
use crate::services::activity_source::{ActivitySource, SourceError};
use crate::services::user_service::UserService;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// An activity together with its first stored review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityDetail {
    pub activity: Activity,
    pub review: Option<Review>,
}

/// Listing, search and ingestion of activities.
///
/// Ingested batches are written in one transaction, and a cached list is only
/// ever replaced after its batch committed.
pub struct ActivityService {
    activities: Arc<dyn ActivityRepository>,
    reviews: Arc<dyn ReviewRepository>,
    user_service: Arc<UserService>,
    source: Arc<dyn ActivitySource>,
    cache: Arc<dyn CacheStore>,
    list_ttl: Duration,
}

fn check_page(page: i64) -> Result<()> {
    if page < 1 {
        return Err(AppError::InvalidArgument(format!(
            "Page must be 1 or greater, got {}",
            page
        )));
    }
    Ok(())
}

fn page_offset(page: i64) -> Result<i64> {
    check_page(page)?;
    (page - 1)
        .checked_mul(PAGE_SIZE)
        .ok_or_else(|| AppError::InvalidArgument(format!("Page {} is out of range", page)))
}

impl ActivityService {
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        reviews: Arc<dyn ReviewRepository>,
        user_service: Arc<UserService>,
        source: Arc<dyn ActivitySource>,
        cache: Arc<dyn CacheStore>,
        list_ttl: Duration,
    ) -> Self {
        Self {
            activities,
            reviews,
            user_service,
            source,
            cache,
            list_ttl,
        }
    }

    pub async fn list(&self, act_type: ActivityType, page: i64) -> Result<ActivityPage> {
        let offset = page_offset(page)?;
        let (data, total) = self
            .activities
            .list_by_type(act_type, PAGE_SIZE, offset)
            .await?;
        Ok(ActivityPage::new(data, total))
    }

    pub async fn search(
        &self,
        act_type: ActivityType,
        keyword: &str,
        page: i64,
    ) -> Result<ActivityPage> {
        if keyword.trim().is_empty() {
            return self.list(act_type, page).await;
        }

        let offset = page_offset(page)?;
        let (data, total) = self
            .activities
            .search_by_title(act_type, keyword, PAGE_SIZE, offset)
            .await?;
        Ok(ActivityPage::new(data, total))
    }

    pub async fn detail(&self, id: &str) -> Result<ActivityDetail> {
        let activity = self
            .activities
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", id)))?;
        let review = self.reviews.first_for_activity(id).await?;

        Ok(ActivityDetail { activity, review })
    }

    pub async fn cached_best(&self, act_type: ActivityType) -> Vec<Activity> {
        cache::get_json(self.cache.as_ref(), &cache::best_key(act_type))
            .await
            .unwrap_or_default()
    }

    pub async fn cached_recommendations(&self, email: &str) -> Result<Vec<Activity>> {
        let user = self.user_service.find_by_email(email).await?;
        Ok(
            cache::get_json(self.cache.as_ref(), &cache::recommendations_key(&user.email))
                .await
                .unwrap_or_default(),
        )
    }

    /// Fetches recommendations for the user's department, stores them and
    /// replaces the user's cached list.
    pub async fn refresh_recommendations(&self, email: &str) -> Result<Vec<Activity>> {
        let user = self.user_service.find_by_email(email).await?;
        let department = user
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                AppError::InvalidArgument(
                    "A department is required for recommendations".to_string(),
                )
            })?;

        let items = self.source.fetch_recommendations(department).await?;

        let now = timestamp_now();
        let activities = items
            .into_iter()
            .map(|item| {
                let act_type = item.act_type.ok_or_else(|| {
                    SourceError::InvalidPayload(format!(
                        "recommended activity '{}' has no actType",
                        item.title
                    ))
                })?;
                Ok(Activity::from_source(item, act_type, &now))
            })
            .collect::<std::result::Result<Vec<_>, SourceError>>()?;

        self.persist(&activities).await?;
        self.store_list(&cache::recommendations_key(&user.email), &activities)
            .await;

        tracing::info!(
            email = %user.email,
            department,
            count = activities.len(),
            "recommendations refreshed"
        );
        Ok(activities)
    }

    /// Replaces the cached best list of `act_type` with a fresh fetch.
    ///
    /// The old list is dropped first, so a failed refresh leaves no list at all.
    pub async fn refresh_all(&self, act_type: ActivityType, page: i64) -> Result<Vec<Activity>> {
        check_page(page)?;
        let key = cache::best_key(act_type);
        self.cache.delete(&key).await;

        let items = self.source.fetch_best(act_type, page).await?;
        let activities = to_activities(items, act_type);

        self.persist(&activities).await?;
        self.store_list(&key, &activities).await;

        tracing::info!(%act_type, page, count = activities.len(), "best list refreshed");
        Ok(activities)
    }

    /// Stores one page of the provider's listing for `act_type`.
    pub async fn ingest_page(&self, act_type: ActivityType, idx: i64) -> Result<Vec<Activity>> {
        check_page(idx)?;
        let items = self.source.fetch_listing(act_type, idx).await?;
        let activities = to_activities(items, act_type);

        self.persist(&activities).await?;

        tracing::info!(%act_type, idx, count = activities.len(), "listing page ingested");
        Ok(activities)
    }

    /// Fetches the provider's review for an activity by its title and stores it.
    pub async fn refresh_review(&self, activity_id: &str) -> Result<Review> {
        let activity = self
            .activities
            .find_by_id(activity_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", activity_id)))?;

        let body = self.source.fetch_review(&activity.title).await?;
        if !body.is_object() {
            return Err(SourceError::InvalidPayload(
                "review payload is not a JSON object".to_string(),
            )
            .into());
        }

        let review = Review {
            id: Uuid::new_v4().to_string(),
            activity_id: activity.id,
            body,
            created_at: timestamp_now(),
        };

        self.reviews.insert(&review).await.map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound(format!("Activity {} not found", activity_id))
            }
            other => other.into(),
        })?;

        Ok(review)
    }

    async fn persist(&self, activities: &[Activity]) -> Result<()> {
        self.activities
            .insert_batch(activities)
            .await
            .map(|_| ())
            .map_err(|e| {
                tracing::error!(error = %e, count = activities.len(), "failed to persist activities");
                AppError::Ingestion(e.to_string())
            })
    }

    async fn store_list(&self, key: &str, activities: &[Activity]) {
        if let Err(e) = cache::set_json(self.cache.as_ref(), key, activities, self.list_ttl).await
        {
            tracing::warn!(key, error = %e, "could not cache activity list");
        }
    }
}

fn to_activities(items: Vec<SourceActivity>, act_type: ActivityType) -> Vec<Activity> {
    let now = timestamp_now();
    items
        .into_iter()
        .map(|item| Activity::from_source(item, act_type, &now))
        .collect()
}
