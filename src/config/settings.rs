use std::collections::HashMap;
use std::env;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use tracing::warn;

use crate::models::ActivityType;

const MIN_PRODUCTION_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("Insecure configuration: {0}")]
    Insecure(String),
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: Vec<u8>,
    pub token_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Lifetime of an emailed verification code.
    pub verification_code_ttl: Duration,
    /// Lifetime of cached best/recommended activity lists.
    pub activity_list_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            verification_code_ttl: Duration::from_secs(300),
            activity_list_ttl: Duration::from_secs(86_400),
        }
    }
}

/// Endpoints of the external activity-data provider.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub timeout: Duration,
    pub recommend_url: Option<String>,
    pub review_url: Option<String>,
    pub listing_urls: HashMap<ActivityType, String>,
    pub best_urls: HashMap<ActivityType, String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            recommend_url: None,
            review_url: None,
            listing_urls: HashMap::new(),
            best_urls: HashMap::new(),
        }
    }
}

impl SourceConfig {
    /// Points every endpoint at `base_url`, one path per endpoint.
    ///
    /// Paths are `/recommendations`, `/reviews`, `/{type}` and `/{type}/best`.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let mut listing_urls = HashMap::new();
        let mut best_urls = HashMap::new();
        for act_type in ActivityType::ALL {
            listing_urls.insert(act_type, format!("{}/{}", base, act_type.as_str()));
            best_urls.insert(act_type, format!("{}/{}/best", base, act_type.as_str()));
        }

        Self {
            recommend_url: Some(format!("{}/recommendations", base)),
            review_url: Some(format!("{}/reviews", base)),
            listing_urls,
            best_urls,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub source: SourceConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = current_environment();
        let is_production = environment == "production";

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_env("PORT", 8080u16)?;

        let auth = AuthConfig {
            jwt_secret: load_jwt_secret(is_production)?,
            token_ttl: Duration::from_secs(parse_env("JWT_TTL_SECS", 86_400u64)?),
        };

        let cache = CacheConfig {
            verification_code_ttl: Duration::from_secs(parse_env(
                "VERIFICATION_CODE_TTL_SECS",
                300u64,
            )?),
            activity_list_ttl: Duration::from_secs(parse_env("ACTIVITY_CACHE_TTL_SECS", 86_400u64)?),
        };

        let mut listing_urls = HashMap::new();
        let mut best_urls = HashMap::new();
        for act_type in ActivityType::ALL {
            let prefix = format!("SOURCE_{}", act_type.as_str().to_ascii_uppercase());
            if let Some(url) = non_empty_env(&format!("{}_URL", prefix)) {
                listing_urls.insert(act_type, url);
            }
            if let Some(url) = non_empty_env(&format!("{}_BEST_URL", prefix)) {
                best_urls.insert(act_type, url);
            }
        }

        let source = SourceConfig {
            timeout: Duration::from_secs(parse_env("SOURCE_TIMEOUT_SECS", 30u64)?),
            recommend_url: non_empty_env("SOURCE_RECOMMEND_URL"),
            review_url: non_empty_env("SOURCE_REVIEW_URL"),
            listing_urls,
            best_urls,
        };

        Ok(Self {
            environment,
            host,
            port,
            database_url,
            auth,
            cache,
            source,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn current_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

fn load_jwt_secret(is_production: bool) -> Result<Vec<u8>, ConfigError> {
    match env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => {
            let bytes = decode_secret_bytes(&secret);
            if is_production {
                validate_production_secret(&secret, &bytes)?;
            }
            Ok(bytes)
        }
        _ if is_production => Err(ConfigError::Missing("JWT_SECRET")),
        _ => {
            warn!("JWT_SECRET not set; generating ephemeral key (development only)");
            let mut bytes = vec![0u8; 64];
            rand::thread_rng().fill_bytes(&mut bytes);
            Ok(bytes)
        }
    }
}

fn validate_production_secret(secret: &str, decoded: &[u8]) -> Result<(), ConfigError> {
    if decoded.len() < MIN_PRODUCTION_SECRET_LEN {
        return Err(ConfigError::Insecure(format!(
            "JWT_SECRET must be at least {} bytes in production",
            MIN_PRODUCTION_SECRET_LEN
        )));
    }

    let lowered = secret.to_ascii_lowercase();
    if lowered.contains("example") || lowered.contains("changeme") || lowered.contains("default") {
        return Err(ConfigError::Insecure(
            "JWT_SECRET appears to be a default value".to_string(),
        ));
    }

    Ok(())
}

fn decode_secret_bytes(secret: &str) -> Vec<u8> {
    STANDARD
        .decode(secret.as_bytes())
        .unwrap_or_else(|_| secret.as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_covers_every_type() {
        let config = SourceConfig::with_base_url("http://localhost:9000/");
        assert_eq!(
            config.recommend_url.as_deref(),
            Some("http://localhost:9000/recommendations")
        );
        for act_type in ActivityType::ALL {
            assert!(config.listing_urls.contains_key(&act_type));
            assert!(config.best_urls[&act_type].ends_with("/best"));
        }
    }

    #[test]
    fn test_production_secret_rules() {
        assert!(validate_production_secret("short", b"short").is_err());
        let placeholder = "changeme".repeat(8);
        assert!(validate_production_secret(&placeholder, placeholder.as_bytes()).is_err());
        let good = "q8Zr!fT2@pLm#9Wx$Vn4&Kd7*Hs1^Gb6";
        assert!(validate_production_secret(good, good.as_bytes()).is_ok());
    }
}
