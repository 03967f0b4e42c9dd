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
        project::{CreateProjectRequest, ProjectWithTasks, UpdateProjectRequest},
        ListQuery,
    },
    services::{metrics, projects::ProjectService},
    AppState,
};

pub async fn list_projects(
    State(state): State<AppState>,
    Query(page): Query<ListQuery>,
) -> Result<Json<Vec<ProjectWithTasks>>, ApiError> {
    let projects = ProjectService::list(&state.db, page).await?;
    Ok(Json(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectWithTasks>, ApiError> {
    ProjectService::get(&state.db, &id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Project"))
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectWithTasks>), ApiError> {
    let project = ProjectService::create(&state.db, &body).await?;
    metrics::record("project", "create");
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectWithTasks>, ApiError> {
    let project = ProjectService::update(&state.db, &id, &body)
        .await?
        .ok_or(ApiError::NotFound("Project"))?;
    metrics::record("project", "update");
    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !ProjectService::delete(&state.db, &id).await? {
        return Err(ApiError::NotFound("Project"));
    }
    metrics::record("project", "delete");
    info!("Deleted project {id} and its tasks");
    Ok(Json(json!({ "message": "Project deleted" })))
}
