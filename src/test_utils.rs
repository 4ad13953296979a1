pub mod test_helpers {
    use crate::config::{AppConfig, AuthConfig, CacheConfig, SourceConfig};
    use crate::models::{timestamp_now, ActivityType};
    use crate::services::email_service::{EmailError, EmailService};
    use async_trait::async_trait;
    use sqlx::{
        sqlite::{SqliteConnectOptions, SqlitePoolOptions},
        SqlitePool,
    };
    use std::str::FromStr;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    pub const TEST_JWT_SECRET: &[u8] = b"integration-test-secret-of-sufficient-length";

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Insert a test user with hashed password
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        password: &str,
        department: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
            })?
            .to_string();

        let now = timestamp_now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, name, department, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind("Test User")
        .bind(department)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert an activity with an explicit creation time
    pub async fn insert_test_activity(
        pool: &SqlitePool,
        id: &str,
        act_type: ActivityType,
        title: &str,
        created_at: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO activities (id, act_type, title, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(act_type)
        .bind(title)
        .bind(created_at)
        .bind(created_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Configuration pointing every activity endpoint at `source_base_url`.
    pub fn test_config(source_base_url: &str) -> AppConfig {
        let mut source = SourceConfig::with_base_url(source_base_url);
        source.timeout = Duration::from_secs(5);

        AppConfig {
            environment: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            auth: AuthConfig {
                jwt_secret: TEST_JWT_SECRET.to_vec(),
                token_ttl: Duration::from_secs(3600),
            },
            cache: CacheConfig::default(),
            source,
        }
    }

    /// Email transport that records every code instead of sending it.
    #[derive(Default)]
    pub struct RecordingEmailService {
        sent: Mutex<Vec<(String, String)>>,
        failing: AtomicBool,
    }

    impl RecordingEmailService {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every following send fail until reset.
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
        }

        /// The most recent code sent to `email`.
        pub fn last_code_for(&self, email: &str) -> Option<String> {
            self.sent()
                .into_iter()
                .rev()
                .find(|(to, _)| to == email)
                .map(|(_, code)| code)
        }
    }

    #[async_trait]
    impl EmailService for RecordingEmailService {
        async fn send_verification_code(&self, to_email: &str, code: &str) -> Result<(), EmailError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(EmailError::SendFailed("recording transport set to fail".to_string()));
            }
            if let Ok(mut sent) = self.sent.lock() {
                sent.push((to_email.to_string(), code.to_string()));
            }
            Ok(())
        }
    }
}
