//! Run summary persisted alongside the tabular outputs

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::ExpressionMatrix;
use crate::error::Result;
use crate::pca::ComponentResult;

/// Scalar summary of one normalization and component analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Sample names, in output order
    pub samples: Vec<String>,
    /// Features retained after joining counts and lengths
    pub n_features: usize,
    /// Whether TPM used one length column per sample; None when no normalization ran
    pub per_sample_lengths: Option<bool>,
    /// Component labels, empty when PCA was skipped
    pub components: Vec<String>,
    /// Percentage of variance per component, one decimal place
    pub explained_variance: Vec<f64>,
}

impl AnalysisSummary {
    /// Summary of an expression matrix before any component analysis
    pub fn new(matrix: &ExpressionMatrix, per_sample_lengths: Option<bool>) -> Self {
        Self {
            samples: matrix.sample_ids().to_vec(),
            n_features: matrix.n_features(),
            per_sample_lengths,
            components: Vec::new(),
            explained_variance: Vec::new(),
        }
    }

    /// Record the components of a finished analysis
    pub fn with_components(mut self, result: &ComponentResult) -> Self {
        self.components = result.labels.clone();
        self.explained_variance = result.variance_ratio.clone();
        self
    }
}

/// Write the summary as pretty-printed JSON
pub fn write_summary_json<P: AsRef<Path>>(path: P, summary: &AnalysisSummary) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.flush()?;
    Ok(())
}
