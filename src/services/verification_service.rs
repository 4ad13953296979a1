use crate::cache::{self, CacheStore};
use crate::error::{AppError, Result};
use crate::services::email_service::EmailService;
use crate::services::user_service::UserService;
use rand::Rng;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Email verification codes.
///
/// Per email the flow is `NoCode -> CodeSent -> (Verified | Expired)`. A code
/// lives in the cache under `verify:<email>` and is only written after the
/// email transport accepted the message, so a failed delivery leaves no
/// trace. Comparison of submitted codes happens here, not in the transport.
pub struct VerificationService {
    user_service: Arc<UserService>,
    email_service: Arc<dyn EmailService>,
    cache: Arc<dyn CacheStore>,
    code_ttl: Duration,
}

impl VerificationService {
    pub fn new(
        user_service: Arc<UserService>,
        email_service: Arc<dyn EmailService>,
        cache: Arc<dyn CacheStore>,
        code_ttl: Duration,
    ) -> Self {
        Self {
            user_service,
            email_service,
            cache,
            code_ttl,
        }
    }

    /// Uniform draw from `0000..=9999`.
    fn generate_code() -> String {
        let code: u16 = rand::thread_rng().gen_range(0..10_000);
        format!("{:04}", code)
    }

    /// Emails a fresh code and stores it, replacing any earlier one.
    pub async fn send(&self, email: &str) -> Result<()> {
        let email = email.trim();
        self.user_service.validate(email).await?;

        let code = Self::generate_code();

        tracing::info!("Attempting to send verification code to: {}", email);
        if let Err(e) = self
            .email_service
            .send_verification_code(email, &code)
            .await
        {
            tracing::error!("❌ Failed to send verification code to {}: {:?}", email, e);
            return Err(AppError::Delivery(e));
        }

        self.cache
            .set(&cache::verification_key(email), json!(code), self.code_ttl)
            .await;
        tracing::info!("✅ Verification code sent to: {}", email);

        Ok(())
    }

    /// Consumes the stored code when `code` matches it.
    ///
    /// A mismatch leaves the stored code in place until it expires.
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<()> {
        let email = email.trim();
        let key = cache::verification_key(email);

        let stored: String = cache::get_json(self.cache.as_ref(), &key)
            .await
            .ok_or(AppError::CodeNotFound)?;

        if stored != code.trim() {
            return Err(AppError::CodeMismatch);
        }

        // A concurrent verification may have consumed it in between.
        if !self.cache.delete(&key).await {
            return Err(AppError::CodeNotFound);
        }

        tracing::info!("Email verified: {}", email);
        Ok(())
    }
}
