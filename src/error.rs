use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Capacity exceeded: {requested} requested, {remaining} remaining")]
    CapacityExceeded { requested: i32, remaining: i32 },
    #[error("Slot is cancelled")]
    SlotCancelled,
    #[error("Invalid capacity: {new_total} is below {booked} booked places")]
    InvalidCapacity { new_total: i32, booked: i32 },
    #[error("Day not allowed: {0}")]
    DayNotAllowed(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

// 23503 = PostgreSQL Foreign Key Violation, 787 = SQLite Foreign Key Constraint
const FOREIGN_KEY_CODES: [&str; 2] = ["23503", "787"];
// 23505 = PostgreSQL Unique Violation, 2067 = SQLite Unique Constraint
const UNIQUE_CODES: [&str; 2] = ["23505", "2067"];

impl AppError {
    /// True when a unique constraint rejected the write.
    pub fn is_unique_violation(&self) -> bool {
        let AppError::Database(e) = self else {
            return false;
        };
        match e.as_database_error().and_then(|db_err| db_err.code()) {
            Some(code) => {
                let code: &str = &code;
                UNIQUE_CODES.contains(&code)
            }
            None => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let code = db_err.code().unwrap_or_default();
                    let code: &str = &code;

                    if UNIQUE_CODES.contains(&code) {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({ "error": "Resource already exists (duplicate entry)" }))
                        ).into_response();
                    }
                    if FOREIGN_KEY_CODES.contains(&code) {
                        warn!("Foreign key violation: {}", db_err.message());
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "error": "Cannot complete the operation: related records exist" }))
                        ).into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::CapacityExceeded { requested, remaining } => (
                StatusCode::BAD_REQUEST,
                format!("Not enough places left: {} requested, {} remaining", requested, remaining),
            ),
            AppError::SlotCancelled => (StatusCode::BAD_REQUEST, "This slot has been cancelled".to_string()),
            AppError::InvalidCapacity { new_total, booked } => (
                StatusCode::BAD_REQUEST,
                format!("Cannot reduce capacity to {}. {} places are already booked.", new_total, booked),
            ),
            AppError::DayNotAllowed(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
