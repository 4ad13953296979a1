use actboard::{
    error::AppError,
    repositories::user_repository::SqliteUserRepository,
    services::auth_service::{AuthService, LoginRequest},
    services::user_service::{CreateUserRequest, UserService},
    test_utils::test_helpers,
};
use std::sync::Arc;

fn request(email: &str) -> CreateUserRequest {
    CreateUserRequest {
        email: email.to_string(),
        password: "password123".to_string(),
        name: "Kim".to_string(),
        department: Some("Computer Science".to_string()),
        admission_date: Some("2022-03-01".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_user_success() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = Arc::new(SqliteUserRepository::new(pool));
    let service = UserService::new(repository);

    let user = service.create_user(request("test@example.com")).await.unwrap();
    assert_eq!(user.email, "test@example.com");
    assert_eq!(user.department.as_deref(), Some("Computer Science"));
    assert_eq!(user.admission_date.as_deref(), Some("2022-03-01"));
    assert!(user.password_hash.starts_with("$argon2"));

    // The hash never leaves the service layer
    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("passwordHash").is_none());
    assert_eq!(json["expectedGraduationDate"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_create_user_duplicate_email() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let service = UserService::new(repository);

    service.create_user(request("duplicate@example.com")).await.unwrap();

    let result = service.create_user(request("duplicate@example.com")).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_validate_against_stored_users() {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_user(&pool, "taken@example.com", "password123", None)
        .await
        .unwrap();
    let service = UserService::new(Arc::new(SqliteUserRepository::new(pool)));

    assert!(service.validate("free@example.com").await.is_ok());
    assert!(matches!(
        service.validate("taken@example.com").await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        service.validate("not-an-email").await,
        Err(AppError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_list_and_delete_users() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = UserService::new(Arc::new(SqliteUserRepository::new(pool)));

    let first = service.create_user(request("a@example.com")).await.unwrap();
    service.create_user(request("b@example.com")).await.unwrap();

    assert_eq!(service.list_users(None, None).await.unwrap().len(), 2);

    service.delete_user(first.id).await.unwrap();
    assert_eq!(service.list_users(None, None).await.unwrap().len(), 1);
    assert!(matches!(
        service.delete_user(first.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_login_against_stored_hash() {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_user(&pool, "login@example.com", "correct-horse", None)
        .await
        .unwrap();

    let user_service = Arc::new(UserService::new(Arc::new(SqliteUserRepository::new(pool))));
    let config = test_helpers::test_config("http://127.0.0.1:9");
    let auth_service = AuthService::new(user_service, config.auth);

    let outcome = auth_service
        .login(LoginRequest {
            email: "login@example.com".to_string(),
            password: "correct-horse".to_string(),
        })
        .await
        .unwrap();
    assert!(!outcome.access_token.is_empty());

    let wrong = auth_service
        .login(LoginRequest {
            email: "login@example.com".to_string(),
            password: "wrong-password".to_string(),
        })
        .await;
    assert!(matches!(wrong, Err(AppError::Unauthorized(_))));
}
