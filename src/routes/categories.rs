use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    error::ApiError,
    models::{
        category::{CreateCategoryRequest, CategoryWithTasks, UpdateCategoryRequest},
        ListQuery,
    },
    services::{metrics, categories::CategoryService},
    AppState,
};

pub async fn list_categories(
    State(state): State<AppState>,
    Query(page): Query<ListQuery>,
) -> Result<Json<Vec<CategoryWithTasks>>, ApiError> {
    let categories = CategoryService::list(&state.db, page).await?;
    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CategoryWithTasks>, ApiError> {
    CategoryService::get(&state.db, &id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Category"))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryWithTasks>), ApiError> {
    let category = CategoryService::create(&state.db, &body).await?;
    metrics::record("category", "create");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryWithTasks>, ApiError> {
    let category = CategoryService::update(&state.db, &id, &body)
        .await?
        .ok_or(ApiError::NotFound("Category"))?;
    metrics::record("category", "update");
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !CategoryService::delete(&state.db, &id).await? {
        return Err(ApiError::NotFound("Category"));
    }
    metrics::record("category", "delete");
    info!("Deleted category {id} and its tasks");
    Ok(Json(json!({ "message": "Category deleted" })))
}
