//! Principal component analysis of expression matrices
//!
//! Samples are observations and features are variables. Each feature is
//! mean-centered across samples (no unit-variance scaling), the centered
//! data is decomposed, and the samples are projected onto the leading
//! components.
//!
//! The decomposition works on the sample Gram matrix X Xᵀ, which has the
//! same non-zero spectrum as the feature covariance XᵀX / (n - 1) but is
//! only samples x samples in size.
//!
//! Component signs are not normalized. Compare results against a reference
//! with [`crate::stats::same_up_to_sign`] or by correlation magnitude.

mod eigen;

pub use eigen::{gram_matrix, EigenDecomposition};

use ndarray::{Array1, Array2, Axis};

use crate::data::ExpressionMatrix;
use crate::error::{Result, ZpcaError};

/// Most components ever retained; keeps plots at three dimensions or fewer
pub const MAX_COMPONENTS: usize = 3;

/// Relative size below which an eigenvalue is treated as zero
const EIGEN_TOLERANCE: f64 = 1e-12;

/// How many components an analysis of a given sample count may retain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentSelection {
    /// PCA over fewer than two samples is not meaningful
    TooFewSamples,
    /// Retain this many components
    Components(usize),
}

/// Decision table keyed by sample count
pub fn select_components(n_samples: usize) -> ComponentSelection {
    match n_samples {
        0 | 1 => ComponentSelection::TooFewSamples,
        2 => ComponentSelection::Components(2),
        _ => ComponentSelection::Components(MAX_COMPONENTS),
    }
}

/// Number of components to compute for a matrix
///
/// Fails with `TooFewSamples` when the matrix has fewer than two sample
/// columns; callers decide whether that ends the pipeline or skips PCA.
pub fn determine_number_of_components(matrix: &ExpressionMatrix) -> Result<usize> {
    match select_components(matrix.n_samples()) {
        ComponentSelection::TooFewSamples => Err(ZpcaError::TooFewSamples {
            n_samples: matrix.n_samples(),
        }),
        ComponentSelection::Components(n) => Ok(n),
    }
}

/// Mean-centered input, samples x features
#[derive(Debug, Clone)]
pub struct ScaledMatrix {
    pub values: Array2<f64>,
    pub sample_ids: Vec<String>,
    pub feature_ids: Vec<String>,
    /// Per-feature means that were subtracted
    pub means: Array1<f64>,
}

/// Component scores, samples x components
#[derive(Debug, Clone)]
pub struct ScoreMatrix {
    pub values: Array2<f64>,
    pub sample_ids: Vec<String>,
    pub labels: Vec<String>,
}

impl ScoreMatrix {
    /// Scores of one component, by label
    pub fn component(&self, label: &str) -> Option<Array1<f64>> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|k| self.values.column(k).to_owned())
    }
}

/// Result of one component analysis
#[derive(Debug, Clone)]
pub struct ComponentResult {
    /// Centered input
    pub scaled: ScaledMatrix,
    /// Per-sample component scores
    pub scores: ScoreMatrix,
    /// Percentage of total variance per component, one decimal place
    pub variance_ratio: Vec<f64>,
    /// "PC1".."PCn"
    pub labels: Vec<String>,
    /// Unit feature-space direction of each component (features x components).
    /// Components with zero retained variance have an all-zero column.
    pub loadings: Array2<f64>,
    /// Variance captured by each component (n - 1 denominator)
    pub eigenvalues: Vec<f64>,
}

impl ComponentResult {
    pub fn n_components(&self) -> usize {
        self.labels.len()
    }
}

/// Labels "PC1".."PCn"
pub fn component_labels(n_components: usize) -> Vec<String> {
    (1..=n_components).map(|k| format!("PC{}", k)).collect()
}

/// Express a fraction as a percentage rounded to one decimal place
///
/// Halves round to even, so 0.0625 becomes 6.2.
pub fn round_percentage(fraction: f64) -> f64 {
    (fraction * 1000.0).round_ties_even() / 10.0
}

/// Center each feature across samples, returning samples x features
pub fn center(matrix: &ExpressionMatrix) -> Result<ScaledMatrix> {
    let observations = matrix.values().t().to_owned();
    let means = observations
        .mean_axis(Axis(0))
        .ok_or_else(|| ZpcaError::EmptyData {
            reason: "Cannot center a matrix with no samples".to_string(),
        })?;
    let values = &observations - &means;

    Ok(ScaledMatrix {
        values,
        sample_ids: matrix.sample_ids().to_vec(),
        feature_ids: matrix.feature_ids().to_vec(),
        means,
    })
}

/// Run PCA retaining exactly `n_components` components
///
/// # Arguments
/// * `matrix` - Expression values (features x samples)
/// * `n_components` - Components to retain, at most min(samples, features)
pub fn perform_pca(matrix: &ExpressionMatrix, n_components: usize) -> Result<ComponentResult> {
    let (n_features, n_samples) = (matrix.n_features(), matrix.n_samples());
    let max = n_samples.min(n_features);
    if n_components == 0 || n_components > max {
        return Err(ZpcaError::InsufficientDimensionality {
            requested: n_components,
            max,
        });
    }
    if !matrix.is_finite() {
        return Err(ZpcaError::NonFiniteInput);
    }

    log::debug!(
        "PCA on {} samples x {} features, {} components",
        n_samples,
        n_features,
        n_components
    );

    // Step 1: center features across samples
    let scaled = center(matrix)?;

    // Step 2: fit
    let gram = gram_matrix(scaled.values.view());
    let total: f64 = gram.diag().sum();
    let eigen = EigenDecomposition::from_symmetric(gram.view())?;
    let lambda_max = eigen.eigenvalues.get(0).copied().unwrap_or(0.0).max(0.0);
    let retained: Vec<f64> = eigen
        .eigenvalues
        .iter()
        .take(n_components)
        .map(|&l| if l > EIGEN_TOLERANCE * lambda_max { l } else { 0.0 })
        .collect();

    // Step 3: project. score_k = u_k * sqrt(lambda_k), loading_k = Xᵀ u_k / sqrt(lambda_k)
    let mut scores: Array2<f64> = Array2::zeros((n_samples, n_components));
    let mut loadings: Array2<f64> = Array2::zeros((n_features, n_components));
    for (k, &lambda) in retained.iter().enumerate() {
        let u = eigen.eigenvectors.column(k);
        let sigma = lambda.sqrt();
        scores.column_mut(k).assign(&u.mapv(|x| x * sigma));
        if sigma > 0.0 {
            let direction = scaled.values.t().dot(&u) / sigma;
            loadings.column_mut(k).assign(&direction);
        }
    }

    // Step 4: explained variance
    let variance_ratio: Vec<f64> = if total > 0.0 {
        retained.iter().map(|&l| round_percentage(l / total)).collect()
    } else {
        log::warn!("All samples are identical; explained variance reported as 0");
        vec![0.0; n_components]
    };
    let denom = n_samples.saturating_sub(1).max(1) as f64;
    let eigenvalues: Vec<f64> = retained.iter().map(|&l| l / denom).collect();

    // Step 5: label
    let labels = component_labels(n_components);

    Ok(ComponentResult {
        scores: ScoreMatrix {
            values: scores,
            sample_ids: scaled.sample_ids.clone(),
            labels: labels.clone(),
        },
        scaled,
        variance_ratio,
        labels,
        loadings,
        eigenvalues,
    })
}

/// Select the component count for a matrix and run PCA
pub fn analyze(matrix: &ExpressionMatrix) -> Result<ComponentResult> {
    let n_components = determine_number_of_components(matrix)?;
    log::info!(
        "Computing {} principal components over {} samples",
        n_components,
        matrix.n_samples()
    );
    let result = perform_pca(matrix, n_components)?;
    for (label, ratio) in result.labels.iter().zip(result.variance_ratio.iter()) {
        log::info!("  {}: {:.1}% of variance", label, ratio);
    }
    Ok(result)
}
