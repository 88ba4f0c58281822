//! Feature length table used for TPM normalization

use ndarray::ArrayView1;

use crate::data::ExpressionMatrix;
use crate::error::{Result, ZpcaError};

/// Feature lengths, indexed by the same identifiers as the counts
///
/// Holds either a single length column shared by all samples, or one
/// column per sample named like the count matrix columns.
#[derive(Debug, Clone, PartialEq)]
pub struct LengthTable {
    table: ExpressionMatrix,
}

impl LengthTable {
    /// Wrap a matrix of lengths
    pub fn new(table: ExpressionMatrix) -> Result<Self> {
        if table.n_samples() == 0 {
            return Err(ZpcaError::InvalidInput {
                reason: "Length table has no length columns".to_string(),
            });
        }
        Ok(Self { table })
    }

    /// Build a shared (single-column) length table
    pub fn shared(feature_ids: Vec<String>, lengths: Vec<f64>) -> Result<Self> {
        let n = lengths.len();
        let values = ndarray::Array2::from_shape_vec((n, 1), lengths).map_err(|e| {
            ZpcaError::DimensionMismatch {
                expected: format!("{} lengths", n),
                got: e.to_string(),
            }
        })?;
        Self::new(ExpressionMatrix::new(values, feature_ids, vec!["length".to_string()])?)
    }

    /// True when one length column applies to every sample
    pub fn is_shared(&self) -> bool {
        self.table.n_samples() == 1
    }

    /// Number of length columns
    pub fn n_columns(&self) -> usize {
        self.table.n_samples()
    }

    /// Underlying table
    pub fn table(&self) -> &ExpressionMatrix {
        &self.table
    }

    /// Feature IDs
    pub fn feature_ids(&self) -> &[String] {
        self.table.feature_ids()
    }

    /// The length column of a shared table
    pub fn lengths(&self) -> Result<ArrayView1<'_, f64>> {
        if !self.is_shared() {
            return Err(ZpcaError::InvalidInput {
                reason: format!(
                    "Expected a single length column, found {}",
                    self.n_columns()
                ),
            });
        }
        Ok(self.table.sample_values(0))
    }

    /// Length column matching a sample name, as a shared table
    pub fn column(&self, name: &str) -> Result<Self> {
        Self::new(self.table.column(name)?)
    }
}
