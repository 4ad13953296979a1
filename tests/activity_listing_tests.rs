use actboard::{
    cache::InMemoryCache,
    error::AppError,
    models::{ActivityType, Review},
    repositories::{
        ActivityRepository, ReviewRepository, SqliteActivityRepository, SqliteReviewRepository,
        SqliteUserRepository,
    },
    services::{activity_service::ActivityService, user_service::UserService, HttpActivitySource},
    test_utils::test_helpers,
};
use serde_json::json;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn service_for(pool: &SqlitePool) -> ActivityService {
    let config = test_helpers::test_config("http://127.0.0.1:9");
    ActivityService::new(
        Arc::new(SqliteActivityRepository::new(pool.clone())),
        Arc::new(SqliteReviewRepository::new(pool.clone())),
        Arc::new(UserService::new(Arc::new(SqliteUserRepository::new(
            pool.clone(),
        )))),
        Arc::new(HttpActivitySource::new(config.source)),
        Arc::new(InMemoryCache::new()),
        Duration::from_secs(60),
    )
}

/// `count` clubs created one second apart, `club-00` being the oldest.
async fn seed_clubs(pool: &SqlitePool, count: usize) {
    for i in 0..count {
        test_helpers::insert_test_activity(
            pool,
            &format!("club-{:02}", i),
            ActivityType::Club,
            &format!("Club number {}", i),
            &format!("2025-03-01T00:00:{:02}.000000Z", i),
        )
        .await
        .unwrap();
    }
}

#[tokio::test]
async fn test_pages_are_disjoint_newest_first_and_complete() {
    let pool = test_helpers::create_test_db().await.unwrap();
    seed_clubs(&pool, 23).await;
    test_helpers::insert_test_activity(
        &pool,
        "contest-1",
        ActivityType::Contest,
        "Not a club",
        "2025-03-02T00:00:00.000000Z",
    )
    .await
    .unwrap();

    let service = service_for(&pool);

    let mut seen = HashSet::new();
    let mut previous: Option<String> = None;
    for page in 1..=3 {
        let result = service.list(ActivityType::Club, page).await.unwrap();
        assert_eq!(result.total, 23);
        assert_eq!(result.last_page, 3);

        for activity in result.data {
            assert_eq!(activity.act_type, ActivityType::Club);
            if let Some(prev) = &previous {
                assert!(activity.created_at <= *prev, "not newest first");
            }
            previous = Some(activity.created_at.clone());
            assert!(seen.insert(activity.id), "row repeated across pages");
        }
    }
    assert_eq!(seen.len(), 23);

    let first = service.list(ActivityType::Club, 1).await.unwrap();
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.data[0].id, "club-22");

    let beyond = service.list(ActivityType::Club, 4).await.unwrap();
    assert!(beyond.data.is_empty());
}

#[tokio::test]
async fn test_empty_type_has_zero_pages() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(&pool);

    let result = service.list(ActivityType::External, 1).await.unwrap();
    assert_eq!(result.total, 0);
    assert_eq!(result.last_page, 0);
    assert!(result.data.is_empty());
}

#[tokio::test]
async fn test_page_below_one_is_rejected() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(&pool);

    assert!(matches!(
        service.list(ActivityType::Club, 0).await,
        Err(AppError::InvalidArgument(_))
    ));
    assert!(matches!(
        service.search(ActivityType::Club, "x", -1).await,
        Err(AppError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_page_past_offset_range_is_rejected() {
    let pool = test_helpers::create_test_db().await.unwrap();
    seed_clubs(&pool, 3).await;
    let service = service_for(&pool);

    assert!(matches!(
        service.list(ActivityType::Club, i64::MAX).await,
        Err(AppError::InvalidArgument(_))
    ));
    assert!(matches!(
        service.search(ActivityType::Club, "club", i64::MAX).await,
        Err(AppError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_empty_search_equals_list() {
    let pool = test_helpers::create_test_db().await.unwrap();
    seed_clubs(&pool, 12).await;
    let service = service_for(&pool);

    for page in 1..=2 {
        assert_eq!(
            service.search(ActivityType::Club, "", page).await.unwrap(),
            service.list(ActivityType::Club, page).await.unwrap()
        );
    }
}

#[tokio::test]
async fn test_search_is_case_insensitive_substring() {
    let pool = test_helpers::create_test_db().await.unwrap();
    for (id, title) in [
        ("a", "Robotics Club"),
        ("b", "Advanced ROBOTICS"),
        ("c", "Chess"),
    ] {
        test_helpers::insert_test_activity(
            &pool,
            id,
            ActivityType::Club,
            title,
            "2025-03-01T00:00:00.000000Z",
        )
        .await
        .unwrap();
    }
    let service = service_for(&pool);

    let result = service
        .search(ActivityType::Club, "robot", 1)
        .await
        .unwrap();
    assert_eq!(result.total, 2);
    assert!(result
        .data
        .iter()
        .all(|a| a.title.to_lowercase().contains("robot")));
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_activity(
        &pool,
        "pct",
        ActivityType::Contest,
        "Top 10% challenge",
        "2025-03-01T00:00:00.000000Z",
    )
    .await
    .unwrap();
    test_helpers::insert_test_activity(
        &pool,
        "plain",
        ActivityType::Contest,
        "Top 100 challenge",
        "2025-03-01T00:00:01.000000Z",
    )
    .await
    .unwrap();
    let service = service_for(&pool);

    let result = service
        .search(ActivityType::Contest, "10%", 1)
        .await
        .unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.data[0].id, "pct");

    let result = service
        .search(ActivityType::Contest, "Top_1", 1)
        .await
        .unwrap();
    assert_eq!(result.total, 0);
}

#[tokio::test]
async fn test_detail_returns_first_review() {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_activity(
        &pool,
        "act-1",
        ActivityType::External,
        "Summer internship",
        "2025-03-01T00:00:00.000000Z",
    )
    .await
    .unwrap();

    let reviews = SqliteReviewRepository::new(pool.clone());
    for (id, rating) in [("r-1", 5), ("r-2", 1)] {
        reviews
            .insert(&Review {
                id: id.to_string(),
                activity_id: "act-1".to_string(),
                body: json!({ "rating": rating }),
                created_at: "2025-03-01T00:00:00.000000Z".to_string(),
            })
            .await
            .unwrap();
    }

    let service = service_for(&pool);
    let detail = service.detail("act-1").await.unwrap();
    assert_eq!(detail.activity.title, "Summer internship");
    let review = detail.review.unwrap();
    assert_eq!(review.id, "r-1");
    assert_eq!(review.body, json!({ "rating": 5 }));

    assert!(matches!(
        service.detail("missing").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_detail_without_reviews() {
    let pool = test_helpers::create_test_db().await.unwrap();
    seed_clubs(&pool, 1).await;
    let service = service_for(&pool);

    let detail = service.detail("club-00").await.unwrap();
    assert!(detail.review.is_none());
}

#[tokio::test]
async fn test_batch_insert_is_all_or_nothing() {
    let pool = test_helpers::create_test_db().await.unwrap();
    seed_clubs(&pool, 1).await;
    let repository = SqliteActivityRepository::new(pool.clone());

    let existing = repository.find_by_id("club-00").await.unwrap().unwrap();
    let mut fresh = existing.clone();
    fresh.id = "club-new".to_string();

    // The duplicate primary key fails the second insert; the first must roll back.
    let result = repository.insert_batch(&[fresh, existing]).await;
    assert!(result.is_err());
    assert!(repository.find_by_id("club-new").await.unwrap().is_none());
}
