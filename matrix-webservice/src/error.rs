use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use matrix_steps::StoreError;
use thiserror::Error;
use validator::ValidationErrors;

use crate::model::ErrorResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Input validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, error_message, details) = match self {
            AppError::Validation(err) => {
                let messages: Vec<String> = err
                    .field_errors()
                    .into_iter()
                    .flat_map(|(_, errors)| errors.iter().map(|e| e.to_string()))
                    .collect();
                (
                    StatusCode::BAD_REQUEST,
                    "Validation Error".to_string(),
                    "One or more input fields failed validation.".to_string(),
                    Some(messages),
                )
            }
            AppError::Store(StoreError::InvalidPreferences(msg)) => (
                StatusCode::BAD_REQUEST,
                "Invalid Preferences".to_string(),
                msg,
                None,
            ),
            AppError::Store(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage Error".to_string(),
                err.to_string(),
                None,
            ),
            AppError::Internal(err_msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
                err_msg,
                None,
            ),
        };

        if status.is_server_error() {
            tracing::error!("{}: {}", error_type, error_message);
        }

        let body = Json(ErrorResponse {
            status_code: status.as_u16(),
            error: error_type,
            message: error_message,
            details,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let invalid = AppError::Store(StoreError::InvalidPreferences("bad".to_string()));
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        let internal = AppError::Internal("lock poisoned".to_string());
        assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
