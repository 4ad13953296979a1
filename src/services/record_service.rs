use crate::error::{AppError, Result};
use crate::models::{CreateRecordRequest, Record, UpdateRecordRequest};
use crate::repositories::{RecordRepository, RepositoryError};
use std::sync::Arc;

/// Personal activity records, always scoped to their author.
pub struct RecordService {
    repository: Arc<dyn RecordRepository>,
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Record {} not found", id))
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidArgument(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl RecordService {
    pub fn new(repository: Arc<dyn RecordRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, author_email: &str, request: CreateRecordRequest) -> Result<Record> {
        require_text("title", &request.title)?;
        require_text("content", &request.content)?;
        require_text("start", &request.start)?;
        require_text("end", &request.end)?;

        match self.repository.create(author_email, &request).await {
            Ok(record) => {
                tracing::debug!(id = record.id, author = author_email, "record created");
                Ok(record)
            }
            Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!(
                "No user registered with {}",
                author_email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list(&self, author_email: &str) -> Result<Vec<Record>> {
        Ok(self.repository.list_by_author(author_email).await?)
    }

    pub async fn get(&self, id: i64, author_email: &str) -> Result<Record> {
        self.repository
            .find(id, author_email)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn update(
        &self,
        id: i64,
        author_email: &str,
        request: UpdateRecordRequest,
    ) -> Result<Record> {
        for (field, value) in [
            ("title", &request.title),
            ("content", &request.content),
            ("start", &request.start),
            ("end", &request.end),
        ] {
            if let Some(value) = value {
                require_text(field, value)?;
            }
        }

        match self.repository.update(id, author_email, &request).await {
            Ok(record) => Ok(record),
            Err(RepositoryError::NotFound) => Err(not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: i64, author_email: &str) -> Result<()> {
        match self.repository.delete(id, author_email).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(not_found(id)),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordCategory;
    use crate::repositories::record_repository::MockRecordRepository;
    use mockall::predicate::*;

    fn request(title: &str) -> CreateRecordRequest {
        CreateRecordRequest {
            category: RecordCategory::Volunteer,
            title: title.to_string(),
            content: "Tutored middle school students".to_string(),
            start: "2025-03-01".to_string(),
            end: "2025-06-30".to_string(),
            impression: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let mut mock_repo = MockRecordRepository::new();
        mock_repo.expect_create().never();

        let service = RecordService::new(Arc::new(mock_repo));
        let result = service.create("a@x.com", request("  ")).await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_blank_title() {
        let mut mock_repo = MockRecordRepository::new();
        mock_repo.expect_update().never();

        let service = RecordService::new(Arc::new(mock_repo));
        let result = service
            .update(
                1,
                "a@x.com",
                UpdateRecordRequest {
                    title: Some(String::new()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_blank_content_and_dates() {
        let mut mock_repo = MockRecordRepository::new();
        mock_repo.expect_update().never();

        let service = RecordService::new(Arc::new(mock_repo));
        for request in [
            UpdateRecordRequest {
                content: Some(String::new()),
                ..Default::default()
            },
            UpdateRecordRequest {
                start: Some("  ".to_string()),
                ..Default::default()
            },
            UpdateRecordRequest {
                end: Some(String::new()),
                ..Default::default()
            },
        ] {
            let result = service.update(1, "a@x.com", request).await;
            assert!(matches!(result, Err(AppError::InvalidArgument(_))));
        }
    }

    #[tokio::test]
    async fn test_get_of_foreign_record_is_not_found() {
        let mut mock_repo = MockRecordRepository::new();
        mock_repo
            .expect_find()
            .with(eq(3), eq("b@x.com"))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(None) }));

        let service = RecordService::new(Arc::new(mock_repo));
        let result = service.get(3, "b@x.com").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let mut mock_repo = MockRecordRepository::new();
        mock_repo
            .expect_delete()
            .returning(|_, _| Box::pin(async move { Err(RepositoryError::NotFound) }));

        let service = RecordService::new(Arc::new(mock_repo));
        let result = service.delete(9, "a@x.com").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
