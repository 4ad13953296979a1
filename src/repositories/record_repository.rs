use super::{RepositoryError, RepositoryResult};
use crate::models::{timestamp_now, CreateRecordRequest, Record, UpdateRecordRequest};
use async_trait::async_trait;
use sqlx::SqlitePool;

const RECORD_COLUMNS: &str = r#"
    id, category, title, content, start_date, end_date,
    impression, author_email, created_at, updated_at
"#;

/// Records are always addressed together with their author, so one user can
/// never read or change another user's rows.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait RecordRepository: Send + Sync {
    async fn create(&self, author_email: &str, request: &CreateRecordRequest)
        -> RepositoryResult<Record>;
    async fn list_by_author(&self, author_email: &str) -> RepositoryResult<Vec<Record>>;
    async fn find(&self, id: i64, author_email: &str) -> RepositoryResult<Option<Record>>;
    async fn update(
        &self,
        id: i64,
        author_email: &str,
        request: &UpdateRecordRequest,
    ) -> RepositoryResult<Record>;
    async fn delete(&self, id: i64, author_email: &str) -> RepositoryResult<()>;
}

pub struct SqliteRecordRepository {
    pool: SqlitePool,
}

impl SqliteRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordRepository for SqliteRecordRepository {
    async fn create(
        &self,
        author_email: &str,
        request: &CreateRecordRequest,
    ) -> RepositoryResult<Record> {
        let now = timestamp_now();
        let result = sqlx::query(
            r#"
            INSERT INTO records (
                category, title, content, start_date, end_date,
                impression, author_email, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.category)
        .bind(&request.title)
        .bind(&request.content)
        .bind(&request.start)
        .bind(&request.end)
        .bind(&request.impression)
        .bind(author_email)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            e => RepositoryError::Database(e),
        })?;

        self.find(result.last_insert_rowid(), author_email)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_by_author(&self, author_email: &str) -> RepositoryResult<Vec<Record>> {
        let query = format!(
            "SELECT {} FROM records WHERE author_email = ? ORDER BY created_at DESC, id DESC",
            RECORD_COLUMNS
        );
        let records = sqlx::query_as::<_, Record>(&query)
            .bind(author_email)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn find(&self, id: i64, author_email: &str) -> RepositoryResult<Option<Record>> {
        let query = format!(
            "SELECT {} FROM records WHERE id = ? AND author_email = ?",
            RECORD_COLUMNS
        );
        let record = sqlx::query_as::<_, Record>(&query)
            .bind(id)
            .bind(author_email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn update(
        &self,
        id: i64,
        author_email: &str,
        request: &UpdateRecordRequest,
    ) -> RepositoryResult<Record> {
        let result = sqlx::query(
            r#"
            UPDATE records SET
                category = COALESCE(?, category),
                title = COALESCE(?, title),
                content = COALESCE(?, content),
                start_date = COALESCE(?, start_date),
                end_date = COALESCE(?, end_date),
                impression = COALESCE(?, impression),
                updated_at = ?
            WHERE id = ? AND author_email = ?
            "#,
        )
        .bind(request.category)
        .bind(&request.title)
        .bind(&request.content)
        .bind(&request.start)
        .bind(&request.end)
        .bind(&request.impression)
        .bind(timestamp_now())
        .bind(id)
        .bind(author_email)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find(id, author_email)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: i64, author_email: &str) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM records WHERE id = ? AND author_email = ?")
            .bind(id)
            .bind(author_email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
