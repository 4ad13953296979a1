use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use super::extract::{ApiJson, ApiQuery};
use super::response::ApiResponse;
use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityPage, ActivityType, Review};
use crate::services::ActivityDetail;
use crate::AppState;

fn default_page() -> i64 {
    1
}

fn parse_type(raw: &str) -> Result<ActivityType> {
    raw.parse::<ActivityType>()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub act_type: String,
    #[serde(default = "default_page")]
    pub page: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(rename = "type")]
    pub act_type: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default = "default_page")]
    pub page: i64,
}

#[derive(Debug, Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub act_type: String,
}

/// Body of the ingestion triggers.
#[derive(Debug, Deserialize)]
pub struct IngestBody {
    #[serde(rename = "type")]
    pub act_type: String,
    #[serde(default = "default_page")]
    pub page: i64,
}

#[derive(Debug, Serialize)]
pub struct ActivityList {
    pub data: Vec<Activity>,
}

/// GET /activities?type=club&page=1
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<ApiResponse<ActivityPage>> {
    let act_type = parse_type(&query.act_type)?;
    let page = state.activity_service.list(act_type, query.page).await?;
    Ok(ApiResponse::ok("OK", page))
}

/// GET /activities/search?type=club&keyword=robot&page=1
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<ApiResponse<ActivityPage>> {
    let act_type = parse_type(&query.act_type)?;
    let page = state
        .activity_service
        .search(act_type, &query.keyword, query.page)
        .await?;
    Ok(ApiResponse::ok("OK", page))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ActivityDetail>> {
    let detail = state.activity_service.detail(&id).await?;
    Ok(ApiResponse::ok("OK", detail))
}

pub async fn best(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TypeQuery>,
) -> Result<ApiResponse<ActivityList>> {
    let act_type = parse_type(&query.act_type)?;
    let data = state.activity_service.cached_best(act_type).await;
    Ok(ApiResponse::ok("OK", ActivityList { data }))
}

pub async fn recommendations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<ActivityList>> {
    let data = state
        .activity_service
        .cached_recommendations(&auth.email)
        .await?;
    Ok(ApiResponse::ok("OK", ActivityList { data }))
}

pub async fn refresh_recommendations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<ActivityList>> {
    let data = state
        .activity_service
        .refresh_recommendations(&auth.email)
        .await?;
    Ok(ApiResponse::ok("Recommendations refreshed", ActivityList { data }))
}

/// POST /activities/best/refresh - Re-fetch and re-cache one type's best list
///
/// ## Request Body (JSON)
/// ```json
/// { "type": "contest", "page": 1 }
/// ```
pub async fn refresh_best(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(body): ApiJson<IngestBody>,
) -> Result<ApiResponse<ActivityList>> {
    let act_type = parse_type(&body.act_type)?;
    let data = state
        .activity_service
        .refresh_all(act_type, body.page)
        .await?;
    Ok(ApiResponse::ok("Best list refreshed", ActivityList { data }))
}

pub async fn ingest(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(body): ApiJson<IngestBody>,
) -> Result<ApiResponse<ActivityList>> {
    let act_type = parse_type(&body.act_type)?;
    let data = state
        .activity_service
        .ingest_page(act_type, body.page)
        .await?;
    Ok(ApiResponse::created("Activities stored", ActivityList { data }))
}

pub async fn refresh_review(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Review>> {
    let review = state.activity_service.refresh_review(&id).await?;
    Ok(ApiResponse::created("Review stored", review))
}
