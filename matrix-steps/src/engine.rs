use matrix_core::{ops, DenseMatrix};
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    panic::{self, AssertUnwindSafe},
};

use crate::{
    error::{Result, StepsError, StoreError},
    format::NumberFormatter,
    model::{
        Computation, DisplayMatrix, DisplayPreferences, HistoryEntry, NumericValue, Operation,
        OperationResult, ResultValue, Step,
    },
    narrative::{self, ElementwiseOp},
    store::{HistoryLedger, InMemoryHistory, InMemoryPreferences, PreferenceStore},
};

/// What a successful operation hands back before it is recorded.
struct Outcome {
    operands: BTreeMap<String, DisplayMatrix>,
    result: ResultValue,
    numeric: NumericValue,
    steps: Vec<Step>,
}

/// Runs matrix operations and narrates them.
///
/// Holds the history ledger and preference store it was built with. Every
/// operation reads the preferences once, computes, and on success appends
/// one entry to the ledger. Operations never panic or return `Err`: every
/// failure comes back as [`OperationResult::Failure`].
pub struct OperationEngine {
    history: Box<dyn HistoryLedger + Send>,
    preferences: Box<dyn PreferenceStore + Send>,
}

impl std::fmt::Debug for OperationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationEngine").finish_non_exhaustive()
    }
}

impl OperationEngine {
    pub fn new(
        history: impl HistoryLedger + Send + 'static,
        preferences: impl PreferenceStore + Send + 'static,
    ) -> Self {
        Self {
            history: Box::new(history),
            preferences: Box::new(preferences),
        }
    }

    /// Engine backed by in-memory stores with default preferences.
    pub fn in_memory() -> Self {
        Self::new(InMemoryHistory::new(), InMemoryPreferences::default())
    }

    pub fn add(&mut self, a: Vec<Vec<f64>>, b: Vec<Vec<f64>>) -> OperationResult {
        self.elementwise(Operation::Add, ElementwiseOp::Add, a, b)
    }

    pub fn subtract(&mut self, a: Vec<Vec<f64>>, b: Vec<Vec<f64>>) -> OperationResult {
        self.elementwise(Operation::Sub, ElementwiseOp::Subtract, a, b)
    }

    pub fn multiply(&mut self, a: Vec<Vec<f64>>, b: Vec<Vec<f64>>) -> OperationResult {
        self.run(Operation::Mul, move |fmt| {
            let (a, b) = (DenseMatrix::from_rows(a)?, DenseMatrix::from_rows(b)?);
            let product = ops::multiply(&a, &b)?;
            let steps = narrative::multiplication_steps(&a, &b, &product, fmt);
            Ok(matrix_outcome(fmt, binary_operands(fmt, &a, &b), product, steps))
        })
    }

    pub fn determinant(&mut self, a: Vec<Vec<f64>>) -> OperationResult {
        self.run(Operation::Det, move |fmt| {
            let a = DenseMatrix::from_rows(a)?;
            let det = ops::determinant(&a)?;
            let steps = narrative::determinant_steps(&a, det, fmt);
            Ok(Outcome {
                operands: unary_operands(fmt, &a),
                result: ResultValue::Scalar(fmt.decimal_to_fraction(det)),
                numeric: NumericValue::Scalar(det),
                steps,
            })
        })
    }

    pub fn transpose(&mut self, a: Vec<Vec<f64>>) -> OperationResult {
        self.run(Operation::Transpose, move |fmt| {
            let a = DenseMatrix::from_rows(a)?;
            let t = ops::transpose(&a);
            let steps = narrative::transpose_steps(&a, fmt);
            Ok(matrix_outcome(fmt, unary_operands(fmt, &a), t, steps))
        })
    }

    pub fn inverse(&mut self, a: Vec<Vec<f64>>) -> OperationResult {
        self.run(Operation::Inverse, move |fmt| {
            let a = DenseMatrix::from_rows(a)?;
            let det = ops::determinant(&a)?;
            let inv = ops::inverse_with_determinant(&a, det)?;
            let steps = narrative::inverse_steps(&a, det, fmt);
            Ok(matrix_outcome(fmt, unary_operands(fmt, &a), inv, steps))
        })
    }

    /// Stored history, newest first.
    pub fn history_list(&self) -> std::result::Result<Vec<HistoryEntry>, StoreError> {
        self.history.list()
    }

    pub fn history_clear(&mut self) -> std::result::Result<(), StoreError> {
        log::info!("Clearing operation history");
        self.history.clear()
    }

    pub fn preferences_get(&self) -> std::result::Result<DisplayPreferences, StoreError> {
        self.preferences.get()
    }

    pub fn preferences_update(
        &mut self,
        partial: Map<String, Value>,
    ) -> std::result::Result<(), StoreError> {
        log::debug!("Updating preferences: {:?}", partial.keys().collect::<Vec<_>>());
        self.preferences.update(partial)
    }

    fn elementwise(
        &mut self,
        operation: Operation,
        op: ElementwiseOp,
        a: Vec<Vec<f64>>,
        b: Vec<Vec<f64>>,
    ) -> OperationResult {
        self.run(operation, move |fmt| {
            let (a, b) = (DenseMatrix::from_rows(a)?, DenseMatrix::from_rows(b)?);
            let c = match op {
                ElementwiseOp::Add => ops::add(&a, &b)?,
                ElementwiseOp::Subtract => ops::subtract(&a, &b)?,
            };
            let steps = narrative::elementwise_steps(op, &a, &b, fmt);
            Ok(matrix_outcome(fmt, binary_operands(fmt, &a, &b), c, steps))
        })
    }

    fn formatter(&self) -> NumberFormatter {
        match self.preferences.get() {
            Ok(prefs) => NumberFormatter::from(&prefs),
            Err(e) => {
                log::warn!("Could not read display preferences, using defaults: {}", e);
                NumberFormatter::default()
            }
        }
    }

    /// Shared driver: computes under `catch_unwind`, converts errors to a
    /// failure result and records successes in the ledger.
    fn run<F>(&mut self, operation: Operation, compute: F) -> OperationResult
    where
        F: FnOnce(&NumberFormatter) -> Result<Outcome>,
    {
        let fmt = self.formatter();
        log::debug!("Running {} operation", operation);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| compute(&fmt)))
            .unwrap_or_else(|payload| Err(StepsError::Panicked(panic_message(payload.as_ref()))));

        match outcome {
            Ok(outcome) => {
                let entry = HistoryEntry::now(
                    operation,
                    outcome.operands,
                    outcome.result.clone(),
                    outcome.steps.clone(),
                );
                if let Err(e) = self.history.append(entry) {
                    log::warn!("Failed to record {} in history: {}", operation, e);
                }
                OperationResult::Success(Computation {
                    result: outcome.result,
                    numeric: outcome.numeric,
                    steps: outcome.steps,
                })
            }
            Err(e) => {
                log::debug!("{} operation failed: {}", operation, e);
                OperationResult::Failure(e.to_string())
            }
        }
    }
}

fn matrix_outcome(
    fmt: &NumberFormatter,
    operands: BTreeMap<String, DisplayMatrix>,
    result: DenseMatrix,
    steps: Vec<Step>,
) -> Outcome {
    Outcome {
        operands,
        result: ResultValue::Matrix(fmt.format_matrix(&result)),
        numeric: NumericValue::Matrix(result),
        steps,
    }
}

fn unary_operands(fmt: &NumberFormatter, a: &DenseMatrix) -> BTreeMap<String, DisplayMatrix> {
    BTreeMap::from([("matrix_a".to_string(), fmt.format_matrix(a))])
}

fn binary_operands(
    fmt: &NumberFormatter,
    a: &DenseMatrix,
    b: &DenseMatrix,
) -> BTreeMap<String, DisplayMatrix> {
    BTreeMap::from([
        ("matrix_a".to_string(), fmt.format_matrix(a)),
        ("matrix_b".to_string(), fmt.format_matrix(b)),
    ])
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "internal computation panicked".to_string()
    }
}
