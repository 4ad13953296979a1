use crate::error::{AppError, Result};
use crate::models::{NewUser, User};
use crate::repositories::{RepositoryError, UserRepository};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub univ: Option<String>,
    pub department: Option<String>,
    pub admission_date: Option<String>,
    pub expected_graduation_date: Option<String>,
}

/// The user directory.
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        let email = request.email.trim().to_string();
        validate_email(&email)?;

        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidArgument(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::InvalidArgument("Name is required".to_string()));
        }

        let new_user = NewUser {
            email,
            password_hash: hash_password(&request.password)?,
            name,
            univ: request.univ,
            department: request.department,
            admission_date: request.admission_date,
            expected_graduation_date: request.expected_graduation_date,
        };

        match self.repository.create_user(&new_user).await {
            Ok(user) => {
                tracing::info!(email = %user.email, "user registered");
                Ok(user)
            }
            Err(RepositoryError::AlreadyExists) => Err(AppError::Conflict(
                "This email is already registered".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Looks a user up by email, failing with `NotFound` when absent.
    pub async fn find_by_email(&self, email: &str) -> Result<User> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No user registered with {}", email)))
    }

    /// Checks that `email` may start a sign-up: well-formed and not taken.
    pub async fn validate(&self, email: &str) -> Result<()> {
        validate_email(email)?;

        if self.repository.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict(
                "This email is already registered".to_string(),
            ));
        }

        Ok(())
    }

    pub async fn list_users(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Vec<User>> {
        Ok(self.repository.list_users(limit, offset).await?)
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        match self.repository.delete_user(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(AppError::NotFound("User not found".to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

fn validate_email(email: &str) -> Result<()> {
    if email.len() > 255 || !EMAIL_PATTERN.is_match(email) {
        return Err(AppError::InvalidArgument("Invalid email address".to_string()));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}
