pub mod activity_handlers;
pub mod auth_handlers;
pub mod extract;
pub mod record_handlers;
pub mod response;

pub use response::{ApiResponse, Empty};

use axum::extract::State;

use crate::error::{AppError, Result};
use crate::AppState;

/// GET /health - Liveness, including a database round trip
pub async fn health(State(state): State<AppState>) -> Result<ApiResponse<Empty>> {
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .map_err(AppError::Database)?;
    Ok(ApiResponse::message("OK"))
}
