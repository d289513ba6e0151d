//! Number and matrix rendering.
//!
//! [`NumberFormatter`] turns a single `f64` into display text, either as an
//! exact fraction (`"3/2"`) when one with a small denominator exists, or as a
//! fixed decimal. [`NumberFormatter::format_matrix`] applies the display
//! preference element-wise.

use matrix_core::{DenseMatrix, Matrix};

use crate::model::{DisplayMatrix, DisplayPreferences, MAX_DECIMAL_PLACES};

/// Values closer than this to an integer or fraction are displayed exactly.
pub const EXACT_TOLERANCE: f64 = 1e-10;

/// Largest denominator searched for when rendering a fraction.
pub const MAX_DENOMINATOR: i64 = 1000;

/// Formatting settings captured from [`DisplayPreferences`] for the
/// lifetime of one operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumberFormatter {
    pub decimal_places: usize,
    pub show_fractions: bool,
}

impl Default for NumberFormatter {
    fn default() -> Self {
        Self::from(&DisplayPreferences::default())
    }
}

impl From<&DisplayPreferences> for NumberFormatter {
    fn from(prefs: &DisplayPreferences) -> Self {
        Self {
            decimal_places: prefs.decimal_places.min(MAX_DECIMAL_PLACES) as usize,
            show_fractions: prefs.show_fractions,
        }
    }
}

impl NumberFormatter {
    /// Renders `x` as an integer, a reduced fraction `p/q` with `q <= 1000`,
    /// or a fixed decimal with `decimal_places` digits, whichever is the
    /// first exact match.
    pub fn decimal_to_fraction(&self, x: f64) -> String {
        if !x.is_finite() {
            return self.fixed(x);
        }
        let nearest = x.round();
        if (x - nearest).abs() < EXACT_TOLERANCE {
            return format_integer(nearest);
        }
        if let Some((p, q)) = best_rational(x, MAX_DENOMINATOR) {
            if (p as f64 / q as f64 - x).abs() < EXACT_TOLERANCE {
                return if q == 1 {
                    p.to_string()
                } else {
                    format!("{}/{}", p, q)
                };
            }
        }
        self.fixed(x)
    }

    /// Fixed-point rendering with `decimal_places` fractional digits.
    pub fn fixed(&self, x: f64) -> String {
        format!("{:.*}", self.decimal_places, x)
    }

    /// One matrix cell, honoring `show_fractions`.
    pub fn format_value(&self, x: f64) -> String {
        if self.show_fractions {
            self.decimal_to_fraction(x)
        } else {
            self.fixed(x)
        }
    }

    /// Formats every element, preserving shape and order.
    pub fn format_matrix(&self, matrix: &DenseMatrix) -> DisplayMatrix {
        (0..matrix.rows())
            .map(|i| matrix.row(i).iter().map(|&x| self.format_value(x)).collect())
            .collect()
    }
}

fn format_integer(value: f64) -> String {
    // i64 covers every integer f64 below 2^63; larger ones print without a fraction part.
    if value.abs() < 9.0e18 {
        (value as i64).to_string()
    } else {
        format!("{:.0}", value)
    }
}

/// Best rational approximation of `x` with denominator at most `max_den`,
/// from the continued-fraction expansion. The closer of the last convergent
/// and the bounding semiconvergent is returned, in lowest terms.
fn best_rational(x: f64, max_den: i64) -> Option<(i64, i64)> {
    if !x.is_finite() || x.abs() >= 1.0e12 {
        return None;
    }
    let sign = if x < 0.0 { -1 } else { 1 };
    let target = x.abs();

    // (p0/q0) previous convergent, (p1/q1) current convergent.
    let (mut p0, mut q0, mut p1, mut q1): (i64, i64, i64, i64) = (0, 1, 1, 0);
    let mut rest = target;
    loop {
        let a = rest.floor();
        if q1 > 0 && a > max_den as f64 {
            break;
        }
        let a_int = a as i64;
        let q2 = q0 + a_int * q1;
        if q2 > max_den {
            break;
        }
        let p2 = p0 + a_int * p1;
        (p0, q0, p1, q1) = (p1, q1, p2, q2);

        let frac = rest - a;
        if frac < f64::EPSILON || (p1 as f64 / q1 as f64 - target).abs() < f64::EPSILON {
            return Some((sign * p1, q1));
        }
        rest = 1.0 / frac;
        if !rest.is_finite() {
            break;
        }
    }
    if q1 == 0 {
        return None;
    }

    let k = (max_den - q0) / q1;
    let (sp, sq) = (p0 + k * p1, q0 + k * q1);
    let convergent_err = (p1 as f64 / q1 as f64 - target).abs();
    let semi_err = (sp as f64 / sq as f64 - target).abs();
    if convergent_err <= semi_err {
        Some((sign * p1, q1))
    } else {
        Some((sign * sp, sq))
    }
}
