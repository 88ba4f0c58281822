//! rust_zpca: TPM normalization and principal component analysis
//!
//! Converts raw read counts into Transcripts Per Million and runs a
//! centered PCA over the samples, producing component scores, explained
//! variance ratios and component labels for export and plotting.
//!
//! # Example
//!
//! ```ignore
//! use rust_zpca::prelude::*;
//!
//! let counts = read_expression_matrix("counts.tsv")?;
//! let lengths = read_length_table("lengths.tsv")?;
//!
//! let tpm = normalize(&counts, &lengths)?;
//! if let Some(result) = run_pca(&tpm)? {
//!     write_scores("loading_scores.tsv", &result.scores)?;
//! }
//! ```

pub mod cli;
pub mod data;
pub mod error;
pub mod io;
pub mod normalization;
pub mod pca;
pub mod render;
pub mod stats;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::data::{ExpressionMatrix, LengthTable};
    pub use crate::error::{Result, ZpcaError};
    pub use crate::io::{
        read_expression_matrix, read_length_table, write_expression_matrix, write_scores,
        write_summary_json, write_variance_summary, AnalysisSummary,
    };
    pub use crate::normalization::{counts2tpm, counts2tpm_many, normalize};
    pub use crate::pca::{
        analyze, determine_number_of_components, perform_pca, select_components,
        ComponentResult, ComponentSelection,
    };
    pub use crate::render::{render_scatter, render_scree, scatter_pairs, RenderOptions};
}

use prelude::*;

/// Run PCA on an expression matrix, treating too few samples as a skip
///
/// Returns `Ok(None)` when the matrix has a single sample; every other
/// failure is an error.
pub fn run_pca(matrix: &ExpressionMatrix) -> Result<Option<ComponentResult>> {
    match analyze(matrix) {
        Ok(result) => Ok(Some(result)),
        Err(ZpcaError::TooFewSamples { n_samples }) => {
            log::warn!(
                "Too few samples for PCA ({} sample), skipping component analysis",
                n_samples
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{matrix_correlation, same_up_to_sign};
    use ndarray::{array, Array2};

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn counts() -> ExpressionMatrix {
        ExpressionMatrix::new(
            array![
                [100.0, 110.0, 90.0, 400.0, 420.0, 380.0],
                [500.0, 520.0, 480.0, 500.0, 510.0, 490.0],
                [300.0, 310.0, 290.0, 75.0, 80.0, 70.0],
                [50.0, 55.0, 45.0, 50.0, 52.0, 48.0],
                [200.0, 220.0, 180.0, 200.0, 210.0, 190.0],
                [150.0, 160.0, 140.0, 300.0, 320.0, 280.0],
                [400.0, 420.0, 380.0, 100.0, 110.0, 90.0],
                [80.0, 85.0, 75.0, 80.0, 82.0, 78.0],
            ],
            ids("gene", 8),
            ids("s", 6),
        )
        .unwrap()
    }

    fn lengths() -> LengthTable {
        LengthTable::shared(
            ids("gene", 8),
            vec![1500.0, 2200.0, 900.0, 3100.0, 1200.0, 800.0, 2600.0, 1750.0],
        )
        .unwrap()
    }

    #[test]
    fn test_full_pipeline() {
        let tpm = normalize(&counts(), &lengths()).unwrap();
        for sum in tpm.column_sums() {
            assert!((sum - 1e6).abs() < 1e-6);
        }

        let result = run_pca(&tpm).unwrap().expect("six samples support PCA");
        assert_eq!(result.labels, vec!["PC1", "PC2", "PC3"]);
        assert_eq!(result.scores.values.dim(), (6, 3));

        // Two groups of three replicates separate on PC1
        let pc1 = result.scores.component("PC1").unwrap();
        let first: Vec<f64> = pc1.iter().take(3).copied().collect();
        let second: Vec<f64> = pc1.iter().skip(3).copied().collect();
        let same_side = |v: &[f64]| v.iter().all(|&x| x > 0.0) || v.iter().all(|&x| x < 0.0);
        assert!(same_side(&first) && same_side(&second));
        assert!(first[0].signum() != second[0].signum());
        assert!(result.variance_ratio[0] > 90.0);
    }

    #[test]
    fn test_single_sample_skips_pca() {
        let single = counts().column("s1").unwrap();
        let tpm = normalize(&single, &lengths()).unwrap();
        assert!(run_pca(&tpm).unwrap().is_none());
    }

    #[test]
    fn test_pca_error_propagates() {
        let tpm = ExpressionMatrix::new(
            array![[1.0, f64::NAN], [2.0, 3.0]],
            ids("gene", 2),
            ids("s", 2),
        )
        .unwrap();
        assert!(matches!(run_pca(&tpm), Err(ZpcaError::NonFiniteInput)));
    }

    #[test]
    fn test_tpm_correlates_with_reference() {
        let counts = counts();
        let lengths = lengths();
        let tpm = counts2tpm(&counts, &lengths).unwrap();

        // Reference: reads per kilobase, scaled per sample to one million
        let kb = lengths.lengths().unwrap().mapv(|l| l / 1000.0);
        let mut reference: Array2<f64> = counts.values().to_owned();
        for (mut row, &k) in reference.rows_mut().into_iter().zip(kb.iter()) {
            row.mapv_inplace(|c| c / k);
        }
        for mut col in reference.columns_mut() {
            let total = col.sum();
            col.mapv_inplace(|r| r / total * 1e6);
        }

        let r = matrix_correlation(tpm.values(), reference.view()).unwrap();
        assert!(r > 0.99, "correlation {}", r);
    }

    #[test]
    fn test_per_sample_slices_merge_to_full() {
        let counts = counts();
        let per_sample = LengthTable::new(
            ExpressionMatrix::new(
                Array2::from_shape_fn((8, 6), |(i, j)| 800.0 + 150.0 * i as f64 + 20.0 * j as f64),
                ids("gene", 8),
                ids("s", 6),
            )
            .unwrap(),
        )
        .unwrap();

        let full = counts2tpm_many(&counts, &per_sample).unwrap();
        let merged = counts
            .sample_ids()
            .iter()
            .map(|s| counts2tpm_many(&counts.column(s).unwrap(), &per_sample).unwrap())
            .reduce(|acc, next| acc.inner_join(&next).unwrap())
            .unwrap();

        assert_eq!(merged.sample_ids(), full.sample_ids());
        for (a, b) in merged.values().iter().zip(full.values().iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rerun_matches_up_to_sign() {
        let tpm = normalize(&counts(), &lengths()).unwrap();
        let a = perform_pca(&tpm, 3).unwrap();
        let b = perform_pca(&tpm, 3).unwrap();
        assert!(same_up_to_sign(a.scores.values.view(), b.scores.values.view(), 1e-6));
    }
}
