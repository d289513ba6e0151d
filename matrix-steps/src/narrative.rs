//! Step-by-step derivations for each operation.
//!
//! The determinant and inverse derivations depend on the matrix order; each
//! case is a variant of [`DeterminantNarrative`] / [`InverseNarrative`]
//! chosen once by `for_matrix` and rendered independently.

use matrix_core::{DenseMatrix, Matrix};

use crate::{format::NumberFormatter, model::Step};

/// Header placed right before the result matrix.
pub const RESULT_MARKER: &str = "Result:";

/// Result cells expanded term-by-term are limited to this many rows and columns.
const WORKED_CELLS: usize = 2;

/// Products up to this size get worked sub-calculations.
const WORKED_MAX_DIM: usize = 3;

pub(crate) fn shape(m: &DenseMatrix) -> String {
    format!("{}x{}", m.rows(), m.cols())
}

fn labelled(label: &str, m: &DenseMatrix, fmt: &NumberFormatter) -> [Step; 2] {
    [Step::from(label), Step::Matrix(fmt.format_matrix(m))]
}

/// Addition and subtraction share everything but the title and sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementwiseOp {
    Add,
    Subtract,
}

impl ElementwiseOp {
    fn title(&self) -> &'static str {
        match self {
            ElementwiseOp::Add => "Addition",
            ElementwiseOp::Subtract => "Subtraction",
        }
    }

    fn symbol(&self) -> char {
        match self {
            ElementwiseOp::Add => '+',
            ElementwiseOp::Subtract => '-',
        }
    }
}

pub fn elementwise_steps(
    op: ElementwiseOp,
    a: &DenseMatrix,
    b: &DenseMatrix,
    fmt: &NumberFormatter,
) -> Vec<Step> {
    let mut steps = vec![Step::Text(format!("{} of {} matrices", op.title(), shape(a)))];
    steps.extend(labelled("Matrix A:", a, fmt));
    steps.extend(labelled("Matrix B:", b, fmt));
    steps.push(Step::Text(format!(
        "Procedure: C[i,j] = A[i,j] {} B[i,j]",
        op.symbol()
    )));
    steps.push(RESULT_MARKER.into());
    steps
}

pub fn multiplication_steps(
    a: &DenseMatrix,
    b: &DenseMatrix,
    product: &DenseMatrix,
    fmt: &NumberFormatter,
) -> Vec<Step> {
    let mut steps = vec![Step::Text(format!(
        "Multiplication of {} × {} matrices",
        shape(a),
        shape(b)
    ))];
    steps.extend(labelled("Matrix A:", a, fmt));
    steps.extend(labelled("Matrix B:", b, fmt));
    steps.push("Procedure: C[i,j] = Σ(A[i,k] × B[k,j])".into());

    if product.rows() <= WORKED_MAX_DIM && product.cols() <= WORKED_MAX_DIM {
        steps.push("Detailed calculations:".into());
        for i in 0..product.rows().min(WORKED_CELLS) {
            for j in 0..product.cols().min(WORKED_CELLS) {
                let terms: Vec<String> = (0..a.cols())
                    .map(|k| {
                        format!(
                            "({} × {})",
                            fmt.decimal_to_fraction(a[(i, k)]),
                            fmt.decimal_to_fraction(b[(k, j)])
                        )
                    })
                    .collect();
                steps.push(Step::Text(format!(
                    "C[{},{}] = {} = {}",
                    i,
                    j,
                    terms.join(" + "),
                    fmt.decimal_to_fraction(product[(i, j)])
                )));
            }
        }
    }

    steps.push(RESULT_MARKER.into());
    steps
}

pub fn transpose_steps(a: &DenseMatrix, fmt: &NumberFormatter) -> Vec<Step> {
    let mut steps = vec![Step::Text(format!("Transpose of {} matrix", shape(a)))];
    steps.extend(labelled("Matrix A:", a, fmt));
    steps.push("Procedure: A^T[i,j] = A[j,i]".into());
    steps.push("The transpose swaps rows and columns".into());
    steps.push(RESULT_MARKER.into());
    steps
}

/// Order-dependent part of a determinant derivation.
#[derive(Clone, Debug, PartialEq)]
pub enum DeterminantNarrative {
    Order1 { a: f64 },
    Order2 { a: f64, b: f64, c: f64, d: f64 },
    Order3 { m: [[f64; 3]; 3] },
    /// Order 4 and above: too large to expand literally.
    Cofactor { order: usize },
}

impl DeterminantNarrative {
    /// Picks the variant for a square matrix.
    pub fn for_matrix(m: &DenseMatrix) -> Self {
        match m.rows() {
            1 => DeterminantNarrative::Order1 { a: m[(0, 0)] },
            2 => DeterminantNarrative::Order2 {
                a: m[(0, 0)],
                b: m[(0, 1)],
                c: m[(1, 0)],
                d: m[(1, 1)],
            },
            3 => {
                let mut rows = [[0.0; 3]; 3];
                for (i, row) in rows.iter_mut().enumerate() {
                    row.copy_from_slice(m.row(i));
                }
                DeterminantNarrative::Order3 { m: rows }
            }
            order => DeterminantNarrative::Cofactor { order },
        }
    }

    pub fn render(&self, fmt: &NumberFormatter) -> Vec<Step> {
        let f = |x: f64| fmt.decimal_to_fraction(x);
        match *self {
            DeterminantNarrative::Order1 { a } => {
                vec![Step::Text(format!("For a 1x1 matrix: det(A) = {}", f(a)))]
            }
            DeterminantNarrative::Order2 { a, b, c, d } => vec![
                "For a 2x2 matrix: det(A) = ad - bc".into(),
                Step::Text(format!(
                    "det(A) = ({})×({}) - ({})×({})",
                    f(a),
                    f(d),
                    f(b),
                    f(c)
                )),
                Step::Text(format!("det(A) = {} - {}", f(a * d), f(b * c))),
            ],
            DeterminantNarrative::Order3 { m } => {
                let minors = [
                    m[1][1] * m[2][2] - m[1][2] * m[2][1],
                    m[1][0] * m[2][2] - m[1][2] * m[2][0],
                    m[1][0] * m[2][1] - m[1][1] * m[2][0],
                ];
                let terms = [
                    m[0][0] * minors[0],
                    m[0][1] * minors[1],
                    m[0][2] * minors[2],
                ];
                vec![
                    "For a 3x3 matrix, expanding along the first row (Sarrus' rule):".into(),
                    "det(A) = a₁₁(a₂₂a₃₃ - a₂₃a₃₂) - a₁₂(a₂₁a₃₃ - a₂₃a₃₁) + a₁₃(a₂₁a₃₂ - a₂₂a₃₁)"
                        .into(),
                    Step::Text(format!(
                        "= {}×({}) - {}×({}) + {}×({})",
                        f(m[0][0]),
                        f(minors[0]),
                        f(m[0][1]),
                        f(minors[1]),
                        f(m[0][2]),
                        f(minors[2])
                    )),
                    Step::Text(format!(
                        "= {} - {} + {}",
                        f(terms[0]),
                        f(terms[1]),
                        f(terms[2])
                    )),
                ]
            }
            DeterminantNarrative::Cofactor { order } => vec![Step::Text(format!(
                "For a {order}x{order} matrix (larger than 3x3) the determinant is computed by cofactor expansion"
            ))],
        }
    }
}

pub fn determinant_steps(a: &DenseMatrix, det: f64, fmt: &NumberFormatter) -> Vec<Step> {
    let mut steps = vec![Step::Text(format!("Determinant of {} matrix", shape(a)))];
    steps.extend(labelled("Matrix A:", a, fmt));
    steps.extend(DeterminantNarrative::for_matrix(a).render(fmt));
    steps.push(Step::Text(format!(
        "Determinant = {}",
        fmt.decimal_to_fraction(det)
    )));
    steps
}

/// Order-dependent part of an inverse derivation.
#[derive(Clone, Debug, PartialEq)]
pub enum InverseNarrative {
    Order1 { a: f64 },
    /// Order 2: the adjugate `[d -b; -c a]` is shown explicitly.
    Order2 { adjugate: DenseMatrix },
    GaussJordan,
}

impl InverseNarrative {
    pub fn for_matrix(m: &DenseMatrix) -> Self {
        match m.rows() {
            1 => InverseNarrative::Order1 { a: m[(0, 0)] },
            2 => {
                let values = vec![m[(1, 1)], -m[(0, 1)], -m[(1, 0)], m[(0, 0)]];
                match DenseMatrix::from_row_major(2, 2, values) {
                    Ok(adjugate) => InverseNarrative::Order2 { adjugate },
                    Err(_) => InverseNarrative::GaussJordan,
                }
            }
            _ => InverseNarrative::GaussJordan,
        }
    }

    pub fn render(&self, det: f64, fmt: &NumberFormatter) -> Vec<Step> {
        match self {
            InverseNarrative::Order1 { a } => vec![Step::Text(format!(
                "For a 1x1 matrix: A⁻¹ = 1/a = 1/{}",
                fmt.decimal_to_fraction(*a)
            ))],
            InverseNarrative::Order2 { adjugate } => vec![
                "For a 2x2 matrix: A⁻¹ = (1/det(A)) × [d -b; -c a]".into(),
                "Adjugate matrix:".into(),
                Step::Matrix(fmt.format_matrix(adjugate)),
                Step::Text(format!(
                    "A⁻¹ = (1/{}) × adjugate matrix",
                    fmt.decimal_to_fraction(det)
                )),
            ],
            InverseNarrative::GaussJordan => vec![
                "For larger matrices the Gauss-Jordan method is used".into(),
                "or the formula A⁻¹ = (1/det(A)) × adj(A)".into(),
            ],
        }
    }
}

pub fn inverse_steps(a: &DenseMatrix, det: f64, fmt: &NumberFormatter) -> Vec<Step> {
    let mut steps = vec![Step::Text(format!("Inverse of {} matrix", shape(a)))];
    steps.extend(labelled("Matrix A:", a, fmt));
    steps.push(Step::Text(format!(
        "Determinant = {}",
        fmt.decimal_to_fraction(det)
    )));
    steps.push("Since det(A) ≠ 0, the matrix is invertible".into());
    steps.extend(InverseNarrative::for_matrix(a).render(det, fmt));
    steps.push(RESULT_MARKER.into());
    steps
}
