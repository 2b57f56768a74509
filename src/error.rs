use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Comment has already been deleted")]
    AlreadyDeleted,

    #[error("{0}")]
    InvalidContent(String),

    #[error("Unsupported resource type: {0}")]
    UnsupportedResource(String),

    #[error("Parent comment does not exist")]
    InvalidParent,

    #[error("{0}")]
    ResourceNotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Store is busy, please retry")]
    StoreTimeout,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Reclassify a raw SQLite error: a lock wait that exhausted the busy
    /// budget is a retryable timeout, not a server fault.
    pub fn from_sqlite(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy)
            | Some(rusqlite::ErrorCode::DatabaseLocked) => AppError::StoreTimeout,
            _ => AppError::Database(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::AlreadyDeleted
            | AppError::InvalidContent(_)
            | AppError::UnsupportedResource(_)
            | AppError::InvalidParent
            | AppError::ResourceNotFound(_)
            | AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::StoreTimeout => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn response_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    #[test]
    fn unauthenticated_returns_401() {
        assert_eq!(
            response_status(AppError::Unauthenticated("Missing authentication token".into())),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn forbidden_returns_403() {
        assert_eq!(
            response_status(AppError::Forbidden("not yours".into())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(
            response_status(AppError::NotFound("comment".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn validation_failures_return_400() {
        assert_eq!(response_status(AppError::AlreadyDeleted), StatusCode::BAD_REQUEST);
        assert_eq!(
            response_status(AppError::InvalidContent("too long".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            response_status(AppError::UnsupportedResource("website".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(response_status(AppError::InvalidParent), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_timeout_returns_503() {
        assert_eq!(
            response_status(AppError::StoreTimeout),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn internal_returns_500() {
        assert_eq!(
            response_status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn busy_sqlite_error_becomes_store_timeout() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked".into()),
        );
        assert!(matches!(AppError::from_sqlite(err), AppError::StoreTimeout));
    }
}
