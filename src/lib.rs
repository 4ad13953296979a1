pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

use cache::CacheStore;
use config::AppConfig;
use repositories::{
    SqliteActivityRepository, SqliteRecordRepository, SqliteReviewRepository,
    SqliteUserRepository,
};
use services::{
    ActivityService, ActivitySource, AuthService, EmailService, RecordService, UserService,
    VerificationService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
    pub verification_service: Arc<VerificationService>,
    pub activity_service: Arc<ActivityService>,
    pub record_service: Arc<RecordService>,
    pub pool: sqlx::SqlitePool,
}

impl AppState {
    /// Wires every service over one pool, one cache and the given
    /// collaborators.
    pub fn new(
        config: AppConfig,
        pool: sqlx::SqlitePool,
        email_service: Arc<dyn EmailService>,
        source: Arc<dyn ActivitySource>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let activity_repository = Arc::new(SqliteActivityRepository::new(pool.clone()));
        let review_repository = Arc::new(SqliteReviewRepository::new(pool.clone()));
        let record_repository = Arc::new(SqliteRecordRepository::new(pool.clone()));

        let user_service = Arc::new(UserService::new(user_repository));
        let auth_service = Arc::new(AuthService::new(
            user_service.clone(),
            config.auth.clone(),
        ));
        let verification_service = Arc::new(VerificationService::new(
            user_service.clone(),
            email_service,
            cache.clone(),
            config.cache.verification_code_ttl,
        ));
        let activity_service = Arc::new(ActivityService::new(
            activity_repository,
            review_repository,
            user_service.clone(),
            source,
            cache,
            config.cache.activity_list_ttl,
        ));
        let record_service = Arc::new(RecordService::new(record_repository));

        Self {
            config: Arc::new(config),
            user_service,
            auth_service,
            verification_service,
            activity_service,
            record_service,
            pool,
        }
    }
}
