use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::error::ErrorKind;

/// Failure returned by every handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Referenced project or category does not exist")]
    InvalidReference,
    #[error(transparent)]
    Store(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let foreign_key = matches!(
            err.downcast_ref::<sqlx::Error>(),
            Some(sqlx::Error::Database(db)) if matches!(db.kind(), ErrorKind::ForeignKeyViolation)
        );
        if foreign_key {
            ApiError::InvalidReference
        } else {
            ApiError::Store(err)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidReference => StatusCode::BAD_REQUEST,
            ApiError::Store(e) => {
                tracing::error!("store error: {e:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
