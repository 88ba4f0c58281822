//! Expression matrix representation for count and TPM tables

use std::collections::{HashMap, HashSet};

use ndarray::{concatenate, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{Result, ZpcaError};

/// Return the first name that occurs more than once
fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(names.len());
    names.iter().map(String::as_str).find(|name| !seen.insert(*name))
}

/// A numeric table indexed by feature identifier
/// Rows are features (genes or transcripts), columns are samples
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionMatrix {
    /// Values (features x samples)
    values: Array2<f64>,
    /// Feature identifiers, unique
    feature_ids: Vec<String>,
    /// Sample names, unique and order-relevant
    sample_ids: Vec<String>,
}

impl ExpressionMatrix {
    /// Create a new expression matrix from raw data
    ///
    /// NaN and +Inf are accepted: they arise from zero or missing feature
    /// lengths during normalization and are passed through unchanged.
    pub fn new(
        values: Array2<f64>,
        feature_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let (n_features, n_samples) = values.dim();

        if feature_ids.len() != n_features {
            return Err(ZpcaError::DimensionMismatch {
                expected: format!("{} feature IDs", n_features),
                got: format!("{} feature IDs", feature_ids.len()),
            });
        }

        if sample_ids.len() != n_samples {
            return Err(ZpcaError::DimensionMismatch {
                expected: format!("{} sample IDs", n_samples),
                got: format!("{} sample IDs", sample_ids.len()),
            });
        }

        if let Some(dup) = first_duplicate(&feature_ids) {
            return Err(ZpcaError::InvalidMatrix {
                reason: format!("Duplicate feature ID '{}'", dup),
            });
        }

        if let Some(dup) = first_duplicate(&sample_ids) {
            return Err(ZpcaError::InvalidMatrix {
                reason: format!("Duplicate sample name '{}'", dup),
            });
        }

        if values.iter().any(|&x| x < 0.0) {
            return Err(ZpcaError::InvalidMatrix {
                reason: "Values must be non-negative".to_string(),
            });
        }

        Ok(Self {
            values,
            feature_ids,
            sample_ids,
        })
    }

    /// Get the number of features
    pub fn n_features(&self) -> usize {
        self.values.nrows()
    }

    /// Get the number of samples
    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    /// Get the values as a view
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Consume the matrix and return the underlying values
    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// Get feature IDs
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    /// Get sample IDs
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Get values for a specific sample
    pub fn sample_values(&self, sample_idx: usize) -> ArrayView1<'_, f64> {
        self.values.column(sample_idx)
    }

    /// Get sample index by ID
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|id| id == sample_id)
    }

    /// Whether every value is finite
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|x| x.is_finite())
    }

    /// Sum of values per sample
    pub fn column_sums(&self) -> Vec<f64> {
        self.values
            .axis_iter(Axis(1))
            .map(|col| col.sum())
            .collect()
    }

    /// Extract a single sample as a one-column matrix
    pub fn column(&self, name: &str) -> Result<Self> {
        let idx = self
            .sample_index(name)
            .ok_or_else(|| ZpcaError::MissingColumn {
                column: name.to_string(),
            })?;
        self.subset_samples(&[idx])
    }

    /// Subset to the named samples, in the order given
    pub fn select_samples(&self, names: &[String]) -> Result<Self> {
        let indices = names
            .iter()
            .map(|name| {
                self.sample_index(name).ok_or_else(|| ZpcaError::MissingColumn {
                    column: name.clone(),
                })
            })
            .collect::<Result<Vec<usize>>>()?;
        self.subset_samples(&indices)
    }

    /// Subset to specific samples
    pub fn subset_samples(&self, sample_indices: &[usize]) -> Result<Self> {
        let new_values = self.values.select(Axis(1), sample_indices);
        let new_sample_ids: Vec<String> = sample_indices
            .iter()
            .map(|&i| self.sample_ids[i].clone())
            .collect();

        Self::new(new_values, self.feature_ids.clone(), new_sample_ids)
    }

    /// Subset to specific features
    pub fn subset_features(&self, feature_indices: &[usize]) -> Result<Self> {
        let new_values = self.values.select(Axis(0), feature_indices);
        let new_feature_ids: Vec<String> = feature_indices
            .iter()
            .map(|&i| self.feature_ids[i].clone())
            .collect();

        Self::new(new_values, new_feature_ids, self.sample_ids.clone())
    }

    /// Row indices of features shared with `other`, as (self, other) pairs in `self` order
    pub fn shared_features(&self, other: &Self) -> Vec<(usize, usize)> {
        let other_index: HashMap<&str, usize> = other
            .feature_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        self.feature_ids
            .iter()
            .enumerate()
            .filter_map(|(i, id)| other_index.get(id.as_str()).map(|&j| (i, j)))
            .collect()
    }

    /// Index-aligned inner join on feature ID
    ///
    /// Keeps only features present in both tables, in `self` order. The
    /// result has the samples of `self` followed by the samples of `other`.
    pub fn inner_join(&self, other: &Self) -> Result<Self> {
        let pairs = self.shared_features(other);
        let left_rows: Vec<usize> = pairs.iter().map(|&(i, _)| i).collect();
        let right_rows: Vec<usize> = pairs.iter().map(|&(_, j)| j).collect();

        let dropped = self.n_features() + other.n_features() - 2 * pairs.len();
        if dropped > 0 {
            log::debug!(
                "Inner join dropped {} unmatched feature(s), {} retained",
                dropped,
                pairs.len()
            );
        }

        let left = self.values.select(Axis(0), &left_rows);
        let right = other.values.select(Axis(0), &right_rows);
        let values = concatenate(Axis(1), &[left.view(), right.view()]).map_err(|e| {
            ZpcaError::DimensionMismatch {
                expected: format!("{} joined rows", left.nrows()),
                got: e.to_string(),
            }
        })?;

        let feature_ids: Vec<String> = left_rows
            .iter()
            .map(|&i| self.feature_ids[i].clone())
            .collect();
        let sample_ids: Vec<String> = self
            .sample_ids
            .iter()
            .chain(other.sample_ids.iter())
            .cloned()
            .collect();

        Self::new(values, feature_ids, sample_ids)
    }
}
