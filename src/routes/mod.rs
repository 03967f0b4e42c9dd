pub mod categories;
pub mod metrics;
pub mod projects;
pub mod stats;
pub mod tasks;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "TaskFlow API v2.0", "status": "データベース統合完了" }))
}

/// Counts tasks so a missing schema reports unhealthy, not just a dead pool.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let tasks: Result<i64, _> = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(&state.db)
        .await;

    match tasks {
        Ok(tasks) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "store": "ready", "tasks": tasks })),
        ),
        Err(e) => {
            tracing::warn!("health check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "store": "unavailable" })),
            )
        }
    }
}

/// Only the configured front-end origins may call the API from a browser.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {o}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .allow_origin(AllowOrigin::list(origins))
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/stats", get(stats::get_stats))
        // Tasks
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{id}",
            get(tasks::get_task).put(tasks::update_task).delete(tasks::delete_task),
        )
        .route("/tasks/{id}/toggle", patch(tasks::toggle_task))
        // Projects
        .route("/projects", get(projects::list_projects).post(projects::create_project))
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        // Categories
        .route("/categories", get(categories::list_categories).post(categories::create_category))
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
