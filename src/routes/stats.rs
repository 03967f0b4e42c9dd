use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    services::stats::{Stats, StatsService},
    AppState,
};

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    let stats = StatsService::compute(&state.db).await?;
    Ok(Json(stats))
}
