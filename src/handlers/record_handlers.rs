use axum::extract::{Path, State};
use serde::Serialize;

use super::extract::ApiJson;
use super::response::{ApiResponse, Empty};
use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::{CreateRecordRequest, Record, UpdateRecordRequest};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RecordList {
    pub data: Vec<Record>,
}

pub async fn list_records(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<RecordList>> {
    let data = state.record_service.list(&auth.email).await?;
    Ok(ApiResponse::ok("OK", RecordList { data }))
}

pub async fn create_record(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<CreateRecordRequest>,
) -> Result<ApiResponse<Record>> {
    let record = state.record_service.create(&auth.email, body).await?;
    Ok(ApiResponse::created("Record created", record))
}

pub async fn get_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Record>> {
    let record = state.record_service.get(id, &auth.email).await?;
    Ok(ApiResponse::ok("OK", record))
}

pub async fn update_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdateRecordRequest>,
) -> Result<ApiResponse<Record>> {
    let record = state.record_service.update(id, &auth.email, body).await?;
    Ok(ApiResponse::ok("Record updated", record))
}

pub async fn delete_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Empty>> {
    state.record_service.delete(id, &auth.email).await?;
    Ok(ApiResponse::message("Record deleted"))
}
