use matrix_steps::{HistoryEntry, OperationResult, ResultValue, Step};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::Validate;

// --- Request Models ---

/// Operands for add, subtract and multiply.
#[derive(Clone, Debug, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
  "matrix_a": [[1, 2], [3, 4]],
  "matrix_b": [[5, 6], [7, 8]]
}))]
pub struct BinaryOperationRequest {
    #[validate(length(min = 1, message = "matrix_a must have at least one row"))]
    pub matrix_a: Vec<Vec<f64>>,
    #[validate(length(min = 1, message = "matrix_b must have at least one row"))]
    pub matrix_b: Vec<Vec<f64>>,
}

/// Operand for determinant, transpose and inverse.
#[derive(Clone, Debug, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
  "matrix": [[1, 2], [3, 4]]
}))]
pub struct UnaryOperationRequest {
    #[validate(length(min = 1, message = "matrix must have at least one row"))]
    pub matrix: Vec<Vec<f64>>,
}

// --- Response Models ---

/// A derivation step: either a line of text or a formatted matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum StepResponse {
    Text(String),
    Matrix(Vec<Vec<String>>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ResultValueResponse {
    Matrix(Vec<Vec<String>>),
    Scalar(String),
}

/// Outcome of a matrix operation. Failures are reported with `success: false`
/// and an `error` message; `result` and `steps` are only present on success.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OperationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultValueResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepResponse>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub timestamp: String,
    pub operation: String,
    pub matrices: BTreeMap<String, Vec<Vec<String>>>,
    pub result: ResultValueResponse,
    pub steps: Vec<StepResponse>,
}

/// Display preferences. Keys other than the ones listed are accepted and
/// returned unchanged.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
  "theme": "light",
  "primary_color": "#007bff",
  "font_size": 14,
  "font_family": "Arial",
  "decimal_places": 4,
  "show_fractions": true
}))]
pub struct PreferencesSchema {
    pub theme: String,
    pub primary_color: String,
    pub font_size: u32,
    pub font_family: String,
    pub decimal_places: u32,
    pub show_fractions: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub status_code: u16,
    pub error: String,
    pub message: String,
    pub details: Option<Vec<String>>,
}

// --- Conversions from the engine types ---

impl From<Step> for StepResponse {
    fn from(step: Step) -> Self {
        match step {
            Step::Text(text) => StepResponse::Text(text),
            Step::Matrix(rows) => StepResponse::Matrix(rows),
        }
    }
}

impl From<ResultValue> for ResultValueResponse {
    fn from(value: ResultValue) -> Self {
        match value {
            ResultValue::Matrix(rows) => ResultValueResponse::Matrix(rows),
            ResultValue::Scalar(text) => ResultValueResponse::Scalar(text),
        }
    }
}

impl From<OperationResult> for OperationResponse {
    fn from(result: OperationResult) -> Self {
        match result {
            OperationResult::Success(computation) => OperationResponse {
                success: true,
                result: Some(computation.result.into()),
                error: None,
                steps: Some(computation.steps.into_iter().map(Into::into).collect()),
            },
            OperationResult::Failure(error) => OperationResponse {
                success: false,
                result: None,
                error: Some(error),
                steps: None,
            },
        }
    }
}

impl From<HistoryEntry> for HistoryEntryResponse {
    fn from(entry: HistoryEntry) -> Self {
        HistoryEntryResponse {
            timestamp: entry.timestamp,
            operation: entry.operation.as_str().to_string(),
            matrices: entry.matrices,
            result: entry.result.into(),
            steps: entry.steps.into_iter().map(Into::into).collect(),
        }
    }
}
