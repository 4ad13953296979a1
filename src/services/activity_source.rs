//! Client for the external activity-data provider.
//!
//! The provider exposes four kinds of JSON endpoints, all configured through
//! [`SourceConfig`]:
//!
//! - a recommendation endpoint queried with `major=<department>`
//! - one "best" endpoint per activity type, queried with `idx=<page>`
//! - one listing endpoint per activity type, queried with `idx=<page>`
//! - a review endpoint queried with `keyword=<activity title>`
//!
//! Activity endpoints answer with a JSON array of activity-shaped objects;
//! the review endpoint answers with a single JSON object.
//!
//! # Example
//!
//! ```rust,no_run
//! use actboard::config::SourceConfig;
//! use actboard::models::ActivityType;
//! use actboard::services::activity_source::{ActivitySource, HttpActivitySource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpActivitySource::new(SourceConfig::with_base_url("http://localhost:9000"));
//! let items = source.fetch_best(ActivityType::Club, 1).await?;
//! println!("{} clubs", items.len());
//! # Ok(())
//! # }
//! ```

use crate::config::SourceConfig;
use crate::models::{ActivityType, SourceActivity};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Errors that can occur while talking to the provider
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("No endpoint configured for {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected payload: {0}")]
    InvalidPayload(String),
}

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ActivitySource: Send + Sync {
    async fn fetch_recommendations(&self, major: &str) -> Result<Vec<SourceActivity>, SourceError>;
    async fn fetch_best(
        &self,
        act_type: ActivityType,
        page: i64,
    ) -> Result<Vec<SourceActivity>, SourceError>;
    async fn fetch_listing(
        &self,
        act_type: ActivityType,
        idx: i64,
    ) -> Result<Vec<SourceActivity>, SourceError>;
    async fn fetch_review(&self, keyword: &str) -> Result<Value, SourceError>;
}

/// [`ActivitySource`] over HTTP.
///
/// Cloning is cheap; the underlying `reqwest::Client` pools connections.
#[derive(Clone)]
pub struct HttpActivitySource {
    client: reqwest::Client,
    config: SourceConfig,
}

impl HttpActivitySource {
    pub fn new(config: SourceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, config }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        tracing::debug!(url, ?query, "fetching from activity source");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    SourceError::RequestFailed(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| SourceError::InvalidPayload(e.to_string()))
    }
}

#[async_trait]
impl ActivitySource for HttpActivitySource {
    async fn fetch_recommendations(&self, major: &str) -> Result<Vec<SourceActivity>, SourceError> {
        let url = self
            .config
            .recommend_url
            .as_deref()
            .ok_or_else(|| SourceError::NotConfigured("recommendations".to_string()))?;

        self.get_json(url, &[("major", major.to_string())]).await
    }

    async fn fetch_best(
        &self,
        act_type: ActivityType,
        page: i64,
    ) -> Result<Vec<SourceActivity>, SourceError> {
        let url = self
            .config
            .best_urls
            .get(&act_type)
            .ok_or_else(|| SourceError::NotConfigured(format!("best {}", act_type)))?;

        self.get_json(url, &[("idx", page.to_string())]).await
    }

    async fn fetch_listing(
        &self,
        act_type: ActivityType,
        idx: i64,
    ) -> Result<Vec<SourceActivity>, SourceError> {
        let url = self
            .config
            .listing_urls
            .get(&act_type)
            .ok_or_else(|| SourceError::NotConfigured(format!("listing {}", act_type)))?;

        self.get_json(url, &[("idx", idx.to_string())]).await
    }

    async fn fetch_review(&self, keyword: &str) -> Result<Value, SourceError> {
        let url = self
            .config
            .review_url
            .as_deref()
            .ok_or_else(|| SourceError::NotConfigured("reviews".to_string()))?;

        self.get_json(url, &[("keyword", keyword.to_string())]).await
    }
}
