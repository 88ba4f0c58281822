//! Statistical utility functions shared across modules
//!
//! Correlation helpers used to compare expression tables and component
//! scores against a reference without requiring exact equality.

use ndarray::{ArrayView1, ArrayView2};

use crate::error::{Result, ZpcaError};

/// Pearson correlation coefficient of two equally long series
///
/// Returns NaN when either series has zero variance or fewer than two
/// values.
pub fn pearson_correlation(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = x.len();
    if n != y.len() || n < 2 {
        return f64::NAN;
    }

    let mean_x = x.sum() / n as f64;
    let mean_y = y.sum() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Pearson correlation of two matrices of the same shape, taken over all entries
pub fn matrix_correlation(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Result<f64> {
    if a.dim() != b.dim() {
        return Err(ZpcaError::DimensionMismatch {
            expected: format!("{:?}", a.dim()),
            got: format!("{:?}", b.dim()),
        });
    }
    let flat_a: Vec<f64> = a.iter().copied().collect();
    let flat_b: Vec<f64> = b.iter().copied().collect();
    Ok(pearson_correlation(
        ArrayView1::from(&flat_a[..]),
        ArrayView1::from(&flat_b[..]),
    ))
}

/// Compare two score matrices column by column, allowing each column to be negated
pub fn same_up_to_sign(a: ArrayView2<f64>, b: ArrayView2<f64>, tol: f64) -> bool {
    if a.dim() != b.dim() {
        return false;
    }
    a.columns().into_iter().zip(b.columns()).all(|(ca, cb)| {
        let same = ca.iter().zip(cb.iter()).all(|(x, y)| (x - y).abs() <= tol);
        let flipped = ca.iter().zip(cb.iter()).all(|(x, y)| (x + y).abs() <= tol);
        same || flipped
    })
}
