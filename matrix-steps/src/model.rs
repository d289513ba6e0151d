use chrono::{SecondsFormat, Utc};
use matrix_core::DenseMatrix;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::StoreError;

/// A matrix rendered for display: same shape as the numeric matrix, one string per cell.
pub type DisplayMatrix = Vec<Vec<String>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Det,
    Transpose,
    Inverse,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Sub => "sub",
            Operation::Mul => "mul",
            Operation::Det => "det",
            Operation::Transpose => "transpose",
            Operation::Inverse => "inverse",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a derivation: either narrative text or an embedded matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Text(String),
    Matrix(DisplayMatrix),
}

impl From<String> for Step {
    fn from(text: String) -> Self {
        Step::Text(text)
    }
}

impl From<&str> for Step {
    fn from(text: &str) -> Self {
        Step::Text(text.to_string())
    }
}

impl From<DisplayMatrix> for Step {
    fn from(matrix: DisplayMatrix) -> Self {
        Step::Matrix(matrix)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    Matrix(DisplayMatrix),
    Scalar(String),
}

/// The raw numeric result, kept alongside the display form so results can be fed back in.
#[derive(Clone, Debug, PartialEq)]
pub enum NumericValue {
    Matrix(DenseMatrix),
    Scalar(f64),
}

impl NumericValue {
    pub fn as_matrix(&self) -> Option<&DenseMatrix> {
        match self {
            NumericValue::Matrix(m) => Some(m),
            NumericValue::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            NumericValue::Scalar(v) => Some(*v),
            NumericValue::Matrix(_) => None,
        }
    }
}

/// A successful operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Computation {
    pub result: ResultValue,
    pub numeric: NumericValue,
    pub steps: Vec<Step>,
}

/// Outcome of every engine operation. Failures carry a non-empty diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationResult {
    Success(Computation),
    Failure(String),
}

impl OperationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success(_))
    }

    pub fn computation(&self) -> Option<&Computation> {
        match self {
            OperationResult::Success(c) => Some(c),
            OperationResult::Failure(_) => None,
        }
    }

    pub fn result(&self) -> Option<&ResultValue> {
        self.computation().map(|c| &c.result)
    }

    pub fn numeric(&self) -> Option<&NumericValue> {
        self.computation().map(|c| &c.numeric)
    }

    pub fn steps(&self) -> Option<&[Step]> {
        self.computation().map(|c| c.steps.as_slice())
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OperationResult::Failure(msg) => Some(msg),
            OperationResult::Success(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub operation: Operation,
    pub matrices: BTreeMap<String, DisplayMatrix>,
    pub result: ResultValue,
    pub steps: Vec<Step>,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current UTC time (RFC 3339 / ISO-8601).
    pub fn now(
        operation: Operation,
        matrices: BTreeMap<String, DisplayMatrix>,
        result: ResultValue,
        steps: Vec<Step>,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            operation,
            matrices,
            result,
            steps,
        }
    }
}

/// Upper bound accepted for `decimal_places`.
pub const MAX_DECIMAL_PLACES: u32 = 20;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayPreferences {
    pub theme: String,
    pub primary_color: String,
    pub font_size: u32,
    pub font_family: String,
    pub decimal_places: u32,
    pub show_fractions: bool,
    /// Keys this crate does not interpret; stored and returned untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            primary_color: "#007bff".to_string(),
            font_size: 14,
            font_family: "Arial".to_string(),
            decimal_places: 4,
            show_fractions: true,
            extra: Map::new(),
        }
    }
}

impl DisplayPreferences {
    /// Shallow merge of `partial` over these preferences. Unknown keys are
    /// kept, known keys are overwritten and must keep their type.
    pub fn merged(&self, partial: Map<String, Value>) -> Result<Self, StoreError> {
        let mut map = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidPreferences(format!(
                    "preferences serialized to a non-object value: {}",
                    other
                )));
            }
        };
        map.extend(partial);
        let merged: Self = serde_json::from_value(Value::Object(map))
            .map_err(|e| StoreError::InvalidPreferences(e.to_string()))?;
        merged.validate()?;
        Ok(merged)
    }

    /// Checks the ranges serde cannot express.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(StoreError::InvalidPreferences(format!(
                "decimal_places must be at most {}, got {}",
                MAX_DECIMAL_PLACES, self.decimal_places
            )));
        }
        Ok(())
    }
}
