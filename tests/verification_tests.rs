use actboard::{
    cache::{self, CacheStore, InMemoryCache},
    error::AppError,
    repositories::user_repository::SqliteUserRepository,
    services::{user_service::UserService, verification_service::VerificationService},
    test_utils::test_helpers::{self, RecordingEmailService},
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    service: VerificationService,
    email: Arc<RecordingEmailService>,
    cache: Arc<InMemoryCache>,
}

async fn fixture() -> Fixture {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_user(&pool, "member@example.com", "password123", None)
        .await
        .unwrap();

    let user_service = Arc::new(UserService::new(Arc::new(SqliteUserRepository::new(pool))));
    let email = Arc::new(RecordingEmailService::new());
    let cache = Arc::new(InMemoryCache::new());
    let service = VerificationService::new(
        user_service,
        email.clone(),
        cache.clone(),
        Duration::from_secs(300),
    );

    Fixture {
        service,
        email,
        cache,
    }
}

#[tokio::test]
async fn test_send_delivers_and_stores_one_code() {
    let f = fixture().await;

    f.service.send("new@example.com").await.unwrap();

    let sent = f.email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "new@example.com");
    assert_eq!(sent[0].1.len(), 4);

    let stored = f
        .cache
        .get(&cache::verification_key("new@example.com"))
        .await;
    assert_eq!(stored, Some(json!(sent[0].1)));
}

#[tokio::test]
async fn test_send_refuses_registered_email() {
    let f = fixture().await;

    let result = f.service.send("member@example.com").await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(f.email.sent().is_empty());
    assert!(f.cache.is_empty().await);
}

#[tokio::test]
async fn test_send_twice_keeps_only_second_code() {
    let f = fixture().await;

    f.service.send("new@example.com").await.unwrap();
    f.service.send("new@example.com").await.unwrap();

    let second = f.email.last_code_for("new@example.com").unwrap();
    assert_eq!(f.cache.len().await, 1);

    f.service.verify_code("new@example.com", &second).await.unwrap();
}

#[tokio::test]
async fn test_failed_delivery_stores_nothing() {
    let f = fixture().await;
    f.email.set_failing(true);

    let result = f.service.send("new@example.com").await;
    assert!(matches!(result, Err(AppError::Delivery(_))));
    assert!(f.cache.is_empty().await);

    let verify = f.service.verify_code("new@example.com", "0000").await;
    assert!(matches!(verify, Err(AppError::CodeNotFound)));
}

#[tokio::test]
async fn test_verify_is_single_use() {
    let f = fixture().await;
    f.service.send("new@example.com").await.unwrap();
    let code = f.email.last_code_for("new@example.com").unwrap();

    f.service.verify_code("new@example.com", &code).await.unwrap();
    let again = f.service.verify_code("new@example.com", &code).await;
    assert!(matches!(again, Err(AppError::CodeNotFound)));
}

#[tokio::test]
async fn test_codes_do_not_collide_with_recommendation_lists() {
    let f = fixture().await;
    f.cache
        .set(
            &cache::recommendations_key("new@example.com"),
            json!([]),
            Duration::from_secs(60),
        )
        .await;

    f.service.send("new@example.com").await.unwrap();
    let code = f.email.last_code_for("new@example.com").unwrap();
    f.service.verify_code("new@example.com", &code).await.unwrap();

    assert_eq!(
        f.cache
            .get(&cache::recommendations_key("new@example.com"))
            .await,
        Some(json!([]))
    );
}
