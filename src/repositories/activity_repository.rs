use super::RepositoryResult;
use crate::models::{Activity, ActivityType};
use async_trait::async_trait;
use sqlx::SqlitePool;

const ACTIVITY_COLUMNS: &str =
    "id, act_type, title, dday, company, link, created_at, updated_at";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ActivityRepository: Send + Sync {
    /// Inserts every activity or none of them.
    async fn insert_batch(&self, activities: &[Activity]) -> RepositoryResult<u64>;
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Activity>>;
    /// One page of a type, newest first, with the total row count of the type.
    async fn list_by_type(
        &self,
        act_type: ActivityType,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<(Vec<Activity>, i64)>;
    /// Like `list_by_type`, restricted to titles containing `keyword`
    /// (case-insensitive).
    async fn search_by_title(
        &self,
        act_type: ActivityType,
        keyword: &str,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<(Vec<Activity>, i64)>;
}

pub struct SqliteActivityRepository {
    pool: SqlitePool,
}

impl SqliteActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_page(
        &self,
        act_type: ActivityType,
        keyword: &str,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<(Vec<Activity>, i64)> {
        let pattern = like_pattern(keyword);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM activities
            WHERE act_type = ? AND title LIKE ? ESCAPE '\'
            "#,
        )
        .bind(act_type)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        // rowid breaks created_at ties so a batch inserted in one instant
        // still pages deterministically.
        let query = format!(
            r#"
            SELECT {} FROM activities
            WHERE act_type = ? AND title LIKE ? ESCAPE '\'
            ORDER BY created_at DESC, rowid DESC
            LIMIT ? OFFSET ?
            "#,
            ACTIVITY_COLUMNS
        );
        let rows = sqlx::query_as::<_, Activity>(&query)
            .bind(act_type)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }
}

/// `%keyword%` with LIKE wildcards in the keyword escaped.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ActivityRepository for SqliteActivityRepository {
    async fn insert_batch(&self, activities: &[Activity]) -> RepositoryResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for activity in activities {
            let result = sqlx::query(
                r#"
                INSERT INTO activities (id, act_type, title, dday, company, link, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&activity.id)
            .bind(activity.act_type)
            .bind(&activity.title)
            .bind(&activity.dday)
            .bind(&activity.company)
            .bind(&activity.link)
            .bind(&activity.created_at)
            .bind(&activity.updated_at)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Activity>> {
        let query = format!("SELECT {} FROM activities WHERE id = ?", ACTIVITY_COLUMNS);
        let activity = sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(activity)
    }

    async fn list_by_type(
        &self,
        act_type: ActivityType,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<(Vec<Activity>, i64)> {
        self.fetch_page(act_type, "", limit, offset).await
    }

    async fn search_by_title(
        &self,
        act_type: ActivityType,
        keyword: &str,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<(Vec<Activity>, i64)> {
        self.fetch_page(act_type, keyword, limit, offset).await
    }
}
