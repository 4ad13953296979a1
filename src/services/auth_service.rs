use crate::auth::jwt;
use crate::config::AuthConfig;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::user_service::{CreateUserRequest, UserService};
use argon2::{password_hash::PasswordHash, Argon2, PasswordVerifier};
use serde::Serialize;
use std::sync::Arc;

pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub access_token: String,
    #[serde(flatten)]
    pub user: User,
}

pub struct AuthService {
    user_service: Arc<UserService>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(user_service: Arc<UserService>, config: AuthConfig) -> Self {
        Self {
            user_service,
            config,
        }
    }

    pub async fn sign_up(&self, request: CreateUserRequest) -> Result<User> {
        self.user_service.create_user(request).await
    }

    /// Checks the credentials and issues an access token.
    ///
    /// An unknown email is `NotFound`; a wrong password is `Unauthorized`.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome> {
        let user = self.user_service.find_by_email(request.email.trim()).await?;

        if !self.verify_password(&request.password, &user.password_hash) {
            tracing::warn!(email = %user.email, "login rejected: wrong password");
            return Err(AppError::Unauthorized("Incorrect password".to_string()));
        }

        let access_token =
            jwt::issue_access_token(&self.config.jwt_secret, &user.email, self.config.token_ttl)
                .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))?;

        tracing::info!(email = %user.email, "user logged in");
        Ok(LoginOutcome { access_token, user })
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        } else {
            false
        }
    }
}
