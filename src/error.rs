//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::booking::responses::ErrorResponse;
use crate::booking::BookingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Booking(#[from] BookingError),
}

impl AppError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Booking(e) => match e {
                BookingError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
                BookingError::EquipmentNotFound(_) => (StatusCode::NOT_FOUND, "equipment_not_found"),
                BookingError::EquipmentInactive(_) => (StatusCode::CONFLICT, "equipment_inactive"),
                BookingError::Conflicted(_) => (StatusCode::CONFLICT, "booking_conflict"),
                BookingError::AvailabilityTimedOut => (StatusCode::GATEWAY_TIMEOUT, "availability_timed_out"),
                BookingError::Payment(_) => (StatusCode::BAD_GATEWAY, "payment_error"),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        let (message, details) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ("Database error".to_string(), None)
            }
            AppError::Booking(BookingError::Conflicted(conflicts)) => (
                self.to_string(),
                serde_json::to_value(conflicts).ok(),
            ),
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            error_type: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
