//! Symmetric eigendecomposition for component analysis

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView2};

use crate::error::{Result, ZpcaError};

/// Eigenvalue decomposition of a symmetric matrix
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues, sorted in descending order
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors; column k belongs to eigenvalue k
    pub eigenvectors: Array2<f64>,
}

impl EigenDecomposition {
    /// Decompose a symmetric matrix, largest eigenvalue first
    ///
    /// Eigenvector signs are whatever the solver produces.
    pub fn from_symmetric(matrix: ArrayView2<f64>) -> Result<Self> {
        let (n, m) = matrix.dim();
        if n != m {
            return Err(ZpcaError::DimensionMismatch {
                expected: format!("square matrix, {} x {}", n, n),
                got: format!("{} x {}", n, m),
            });
        }
        if !matrix.iter().all(|x| x.is_finite()) {
            return Err(ZpcaError::NonFiniteInput);
        }

        let eigen = SymmetricEigen::new(DMatrix::from_fn(n, n, |i, j| matrix[[i, j]]));

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .partial_cmp(&eigen.eigenvalues[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let eigenvalues = order.iter().map(|&k| eigen.eigenvalues[k]).collect();
        let eigenvectors = Array2::from_shape_fn((n, n), |(i, k)| eigen.eigenvectors[(i, order[k])]);

        Ok(Self {
            eigenvalues,
            eigenvectors,
        })
    }
}

/// Gram matrix X Xᵀ of the rows of `x`
pub fn gram_matrix(x: ArrayView2<f64>) -> Array2<f64> {
    x.dot(&x.t())
}
