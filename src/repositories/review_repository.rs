use super::{RepositoryError, RepositoryResult};
use crate::models::Review;
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ReviewRepository: Send + Sync {
    async fn insert(&self, review: &Review) -> RepositoryResult<()>;
    /// The earliest stored review of an activity.
    async fn first_for_activity(&self, activity_id: &str) -> RepositoryResult<Option<Review>>;
}

pub struct SqliteReviewRepository {
    pool: SqlitePool,
}

impl SqliteReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn review_from_row(row: &SqliteRow) -> RepositoryResult<Review> {
    let body: String = row.try_get("body")?;
    let body = serde_json::from_str(&body)
        .map_err(|e| RepositoryError::Database(sqlx::Error::Decode(Box::new(e))))?;

    Ok(Review {
        id: row.try_get("id")?,
        activity_id: row.try_get("activity_id")?,
        body,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ReviewRepository for SqliteReviewRepository {
    async fn insert(&self, review: &Review) -> RepositoryResult<()> {
        let body = review.body.to_string();
        let result = sqlx::query(
            "INSERT INTO reviews (id, activity_id, body, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&review.id)
        .bind(&review.activity_id)
        .bind(body)
        .bind(&review.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(RepositoryError::NotFound)
            }
            Err(e) => Err(RepositoryError::Database(e)),
        }
    }

    async fn first_for_activity(&self, activity_id: &str) -> RepositoryResult<Option<Review>> {
        let row = sqlx::query(
            r#"
            SELECT id, activity_id, body, created_at
            FROM reviews
            WHERE activity_id = ?
            ORDER BY rowid ASC
            LIMIT 1
            "#,
        )
        .bind(activity_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(review_from_row).transpose()
    }
}
