use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    entities::{cafe, cafe_table, menu_set},
    errors::ServiceError,
    handlers::AppState,
    queries::availability_queries::AvailabilityReport,
    services::inventory::{
        AddTableRequest, CreateCafeRequest, CreateMenuSetRequest, UpdateCafeRequest,
    },
    ApiResponse, ApiResult,
};

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub date: NaiveDate,
}

pub async fn list_cafes(State(state): State<AppState>) -> ApiResult<Vec<cafe::Model>> {
    let cafes = state.inventory_service.list_cafes().await?;
    Ok(Json(ApiResponse::success(cafes)))
}

pub async fn create_cafe(
    State(state): State<AppState>,
    payload: Result<Json<CreateCafeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<cafe::Model>>), ServiceError> {
    let Json(payload) = payload?;
    let created = state.inventory_service.create_cafe(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn get_cafe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<cafe::Model> {
    let found = state.inventory_service.get_cafe(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

pub async fn update_cafe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateCafeRequest>, JsonRejection>,
) -> ApiResult<cafe::Model> {
    let Json(payload) = payload?;
    let updated = state.inventory_service.update_cafe(id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_cafe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.inventory_service.delete_cafe(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_tables(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<cafe_table::Model>> {
    let tables = state.inventory_service.list_tables(id).await?;
    Ok(Json(ApiResponse::success(tables)))
}

pub async fn add_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<AddTableRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<cafe_table::Model>>), ServiceError> {
    let Json(payload) = payload?;
    let table = state.inventory_service.add_table(id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(table))))
}

/// `GET /cafes/:id/availability?date=YYYY-MM-DD`
pub async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<AvailabilityParams>,
) -> ApiResult<AvailabilityReport> {
    let report = state
        .reservation_service
        .availability(id, params.date)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

pub async fn list_menu_sets(State(state): State<AppState>) -> ApiResult<Vec<menu_set::Model>> {
    let sets = state.inventory_service.list_menu_sets().await?;
    Ok(Json(ApiResponse::success(sets)))
}

pub async fn create_menu_set(
    State(state): State<AppState>,
    payload: Result<Json<CreateMenuSetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<menu_set::Model>>), ServiceError> {
    let Json(payload) = payload?;
    let created = state.inventory_service.create_menu_set(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}
