use crate::{
    error::AppError,
    model::{
        BinaryOperationRequest, ErrorResponse as ModelErrorResponse, HistoryEntryResponse,
        OperationResponse, PreferencesSchema, StatusResponse, UnaryOperationRequest,
    },
};

use axum::{extract::State, Json};
use matrix_steps::{DisplayPreferences, OperationEngine, OperationResult};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use validator::Validate;

/// Shared engine. Operations also write history, so every request takes the
/// lock exclusively.
#[derive(Clone, Debug)]
pub struct AppState {
    pub engine: Arc<Mutex<OperationEngine>>,
}

impl AppState {
    pub fn new(engine: OperationEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    fn engine(&self) -> Result<MutexGuard<'_, OperationEngine>, AppError> {
        self.engine
            .lock()
            .map_err(|_| AppError::Internal("Operation engine lock poisoned".to_string()))
    }
}

fn respond(operation: &str, result: OperationResult) -> Json<OperationResponse> {
    match &result {
        OperationResult::Success(_) => {
            tracing::debug!(target: "matrix_webservice::handler", "{} succeeded", operation)
        }
        OperationResult::Failure(error) => {
            tracing::info!(target: "matrix_webservice::handler", "{} failed: {}", operation, error)
        }
    }
    Json(result.into())
}

#[utoipa::path(
    post,
    path = "/api/add",
    request_body = BinaryOperationRequest,
    responses(
        (status = 200, description = "Sum of both matrices with steps, or success=false with the reason.", body = OperationResponse),
        (status = 400, description = "Invalid request payload.", body = ModelErrorResponse)
    ),
    tag = "Matrix Operations"
)]
pub async fn add_handler(
    State(state): State<AppState>,
    Json(payload): Json<BinaryOperationRequest>,
) -> Result<Json<OperationResponse>, AppError> {
    payload.validate()?;
    let result = state.engine()?.add(payload.matrix_a, payload.matrix_b);
    Ok(respond("add", result))
}

#[utoipa::path(
    post,
    path = "/api/subtract",
    request_body = BinaryOperationRequest,
    responses(
        (status = 200, description = "Difference A - B with steps, or success=false with the reason.", body = OperationResponse),
        (status = 400, description = "Invalid request payload.", body = ModelErrorResponse)
    ),
    tag = "Matrix Operations"
)]
pub async fn subtract_handler(
    State(state): State<AppState>,
    Json(payload): Json<BinaryOperationRequest>,
) -> Result<Json<OperationResponse>, AppError> {
    payload.validate()?;
    let result = state.engine()?.subtract(payload.matrix_a, payload.matrix_b);
    Ok(respond("subtract", result))
}

#[utoipa::path(
    post,
    path = "/api/multiply",
    request_body = BinaryOperationRequest,
    responses(
        (status = 200, description = "Product A × B with steps, or success=false with the reason.", body = OperationResponse),
        (status = 400, description = "Invalid request payload.", body = ModelErrorResponse)
    ),
    tag = "Matrix Operations"
)]
pub async fn multiply_handler(
    State(state): State<AppState>,
    Json(payload): Json<BinaryOperationRequest>,
) -> Result<Json<OperationResponse>, AppError> {
    payload.validate()?;
    let result = state.engine()?.multiply(payload.matrix_a, payload.matrix_b);
    Ok(respond("multiply", result))
}

#[utoipa::path(
    post,
    path = "/api/determinant",
    request_body = UnaryOperationRequest,
    responses(
        (status = 200, description = "Determinant with steps, or success=false with the reason.", body = OperationResponse),
        (status = 400, description = "Invalid request payload.", body = ModelErrorResponse)
    ),
    tag = "Matrix Operations"
)]
pub async fn determinant_handler(
    State(state): State<AppState>,
    Json(payload): Json<UnaryOperationRequest>,
) -> Result<Json<OperationResponse>, AppError> {
    payload.validate()?;
    let result = state.engine()?.determinant(payload.matrix);
    Ok(respond("determinant", result))
}

#[utoipa::path(
    post,
    path = "/api/transpose",
    request_body = UnaryOperationRequest,
    responses(
        (status = 200, description = "Transpose with steps, or success=false with the reason.", body = OperationResponse),
        (status = 400, description = "Invalid request payload.", body = ModelErrorResponse)
    ),
    tag = "Matrix Operations"
)]
pub async fn transpose_handler(
    State(state): State<AppState>,
    Json(payload): Json<UnaryOperationRequest>,
) -> Result<Json<OperationResponse>, AppError> {
    payload.validate()?;
    let result = state.engine()?.transpose(payload.matrix);
    Ok(respond("transpose", result))
}

#[utoipa::path(
    post,
    path = "/api/inverse",
    request_body = UnaryOperationRequest,
    responses(
        (status = 200, description = "Inverse with steps, or success=false with the reason.", body = OperationResponse),
        (status = 400, description = "Invalid request payload.", body = ModelErrorResponse)
    ),
    tag = "Matrix Operations"
)]
pub async fn inverse_handler(
    State(state): State<AppState>,
    Json(payload): Json<UnaryOperationRequest>,
) -> Result<Json<OperationResponse>, AppError> {
    payload.validate()?;
    let result = state.engine()?.inverse(payload.matrix);
    Ok(respond("inverse", result))
}

#[utoipa::path(
    get,
    path = "/api/history",
    responses(
        (status = 200, description = "Stored operations, newest first.", body = Vec<HistoryEntryResponse>),
        (status = 500, description = "History could not be read.", body = ModelErrorResponse)
    ),
    tag = "History"
)]
pub async fn history_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntryResponse>>, AppError> {
    let entries = state.engine()?.history_list()?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/history/clear",
    responses(
        (status = 200, description = "success=true once the history is empty, otherwise the reason.", body = StatusResponse)
    ),
    tag = "History"
)]
pub async fn clear_history_handler(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, AppError> {
    match state.engine()?.history_clear() {
        Ok(()) => Ok(Json(StatusResponse::ok())),
        Err(e) => {
            tracing::warn!(target: "matrix_webservice::handler", "Failed to clear history: {}", e);
            Ok(Json(StatusResponse::failed(e.to_string())))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Current display preferences.", body = PreferencesSchema)
    ),
    tag = "Settings"
)]
pub async fn get_settings_handler(
    State(state): State<AppState>,
) -> Result<Json<DisplayPreferences>, AppError> {
    Ok(Json(state.engine()?.preferences_get()?))
}

#[utoipa::path(
    post,
    path = "/api/settings",
    request_body(content = PreferencesSchema, description = "Any subset of the preference keys; other keys are stored as given."),
    responses(
        (status = 200, description = "Preferences merged and saved.", body = StatusResponse),
        (status = 400, description = "A known key has the wrong type.", body = ModelErrorResponse)
    ),
    tag = "Settings"
)]
pub async fn update_settings_handler(
    State(state): State<AppState>,
    Json(partial): Json<Map<String, Value>>,
) -> Result<Json<StatusResponse>, AppError> {
    state.engine()?.preferences_update(partial)?;
    Ok(Json(StatusResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResultValueResponse, StepResponse};
    use serde_json::json;

    fn state() -> AppState {
        AppState::new(OperationEngine::in_memory())
    }

    fn rows(values: &[&[f64]]) -> Vec<Vec<f64>> {
        values.iter().map(|r| r.to_vec()).collect()
    }

    fn strings(values: &[&[&str]]) -> Vec<Vec<String>> {
        values
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_add_returns_result_and_steps() {
        let state = state();
        let Json(response) = add_handler(
            State(state.clone()),
            Json(BinaryOperationRequest {
                matrix_a: rows(&[&[1.0, 2.0], &[3.0, 4.0]]),
                matrix_b: rows(&[&[5.0, 6.0], &[7.0, 8.0]]),
            }),
        )
        .await
        .unwrap();

        assert!(response.success);
        assert_eq!(
            response.result,
            Some(ResultValueResponse::Matrix(strings(&[&["6", "8"], &["10", "12"]])))
        );
        let steps = response.steps.unwrap();
        assert_eq!(
            steps.first(),
            Some(&StepResponse::Text("Addition of 2x2 matrices".to_string()))
        );

        let Json(history) = history_handler(State(state)).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].operation, "add");
    }

    #[tokio::test]
    async fn test_engine_failure_is_reported_in_body() {
        let Json(response) = determinant_handler(
            State(state()),
            Json(UnaryOperationRequest {
                matrix: rows(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]),
            }),
        )
        .await
        .unwrap();

        assert!(!response.success);
        assert!(response.error.unwrap().contains("square"));
        assert!(response.result.is_none());
        assert!(response.steps.is_none());
    }

    #[tokio::test]
    async fn test_empty_matrix_is_a_validation_error() {
        let err = inverse_handler(State(state()), Json(UnaryOperationRequest { matrix: vec![] }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_failed_operation_is_not_recorded() {
        let state = state();
        let Json(response) = inverse_handler(
            State(state.clone()),
            Json(UnaryOperationRequest {
                matrix: rows(&[&[1.0, 2.0], &[2.0, 4.0]]),
            }),
        )
        .await
        .unwrap();
        assert!(!response.success);

        let Json(history) = history_handler(State(state)).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_clear_history() {
        let state = state();
        transpose_handler(
            State(state.clone()),
            Json(UnaryOperationRequest {
                matrix: rows(&[&[1.0, 2.0]]),
            }),
        )
        .await
        .unwrap();

        let Json(status) = clear_history_handler(State(state.clone())).await.unwrap();
        assert_eq!(status, StatusResponse::ok());
        let Json(history) = history_handler(State(state)).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_settings_merge_and_affect_formatting() {
        let state = state();
        let Json(defaults) = get_settings_handler(State(state.clone())).await.unwrap();
        assert_eq!(defaults, DisplayPreferences::default());

        let partial = json!({"show_fractions": false, "decimal_places": 2, "language": "es"});
        update_settings_handler(State(state.clone()), Json(partial.as_object().unwrap().clone()))
            .await
            .unwrap();

        let Json(current) = get_settings_handler(State(state.clone())).await.unwrap();
        assert!(!current.show_fractions);
        assert_eq!(current.decimal_places, 2);
        assert_eq!(current.theme, "light");
        assert_eq!(current.extra.get("language"), Some(&json!("es")));

        let Json(response) = inverse_handler(
            State(state),
            Json(UnaryOperationRequest {
                matrix: rows(&[&[1.0, 2.0], &[3.0, 4.0]]),
            }),
        )
        .await
        .unwrap();
        assert_eq!(
            response.result,
            Some(ResultValueResponse::Matrix(strings(&[
                &["-2.00", "1.00"],
                &["1.50", "-0.50"]
            ])))
        );
    }

    #[tokio::test]
    async fn test_settings_type_mismatch_is_rejected() {
        let partial = json!({"font_size": "large"});
        let err =
            update_settings_handler(State(state()), Json(partial.as_object().unwrap().clone()))
                .await
                .unwrap_err();
        assert!(matches!(
            err,
            AppError::Store(matrix_steps::StoreError::InvalidPreferences(_))
        ));
    }
}
