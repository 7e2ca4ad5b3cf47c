/// Error types for Blog Service
///
/// Every lifecycle operation either completes or returns one of these errors
/// with no persisted side effect. Errors render as JSON for API clients.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use sqlx::error::ErrorKind;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness or referential constraint rejected by the store
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Request payload failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A reply chain loops back on itself
    #[error("Cycle detected in reply chain at comment {0}")]
    CycleDetected(i64),

    /// Any other store failure
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::ConstraintViolation(_) => "constraint_violation",
            AppError::Validation(_) => "validation",
            AppError::CycleDetected(_) => "cycle_detected",
            AppError::Database(_) => "database",
            AppError::Internal(_) => "internal",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::CycleDetected(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        crate::metrics::REQUEST_ERRORS_TOTAL
            .with_label_values(&[self.kind()])
            .inc();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return AppError::ConstraintViolation(db_err.message().to_string());
                }
                _ => {}
            }
        }
        AppError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("failed to encode response: {}", err))
    }
}
