use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    models::{
        task::{CreateTaskRequest, Task, UpdateTaskRequest},
        ListQuery,
    },
    services::{metrics, tasks::TaskService},
    AppState,
};

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(page): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = TaskService::list(&state.db, page).await?;
    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    TaskService::get(&state.db, &id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Task"))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = TaskService::create(&state.db, &body).await?;
    metrics::record("task", "create");
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let task = TaskService::update(&state.db, &id, &body)
        .await?
        .ok_or(ApiError::NotFound("Task"))?;
    metrics::record("task", "update");
    Ok(Json(task))
}

/// PATCH /tasks/{id}/toggle
pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = TaskService::toggle(&state.db, &id)
        .await?
        .ok_or(ApiError::NotFound("Task"))?;
    metrics::record("task", "toggle");
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !TaskService::delete(&state.db, &id).await? {
        return Err(ApiError::NotFound("Task"));
    }
    metrics::record("task", "delete");
    Ok(Json(json!({ "message": "Task deleted" })))
}
