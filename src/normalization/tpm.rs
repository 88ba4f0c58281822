//! Transcripts Per Million (TPM) normalization
//!
//! rate = count / length, per feature and sample
//! TPM  = rate / sum(rate over features) * 1e6
//!
//! Counts and lengths are joined on feature ID before the rates are taken;
//! features missing from either table are dropped, not reported as errors.

use ndarray::Axis;

use crate::data::{ExpressionMatrix, LengthTable};
use crate::error::{Result, ZpcaError};

/// Scale factor applied after dividing by the per-sample rate sum
pub const TPM_SCALE: f64 = 1e6;

/// Convert a table of raw counts to TPM using one shared length column
///
/// # Arguments
/// * `counts` - Raw counts (features x samples)
/// * `lengths` - Single-column length table indexed by feature ID
///
/// Zero lengths produce infinite rates and missing (NaN) lengths produce
/// NaN rates; neither is special-cased. NaN rates are left out of the
/// per-sample denominator.
pub fn counts2tpm(counts: &ExpressionMatrix, lengths: &LengthTable) -> Result<ExpressionMatrix> {
    let length_col = lengths.lengths()?;

    let pairs = counts.shared_features(lengths.table());
    if pairs.is_empty() {
        return Err(ZpcaError::EmptyData {
            reason: "No feature IDs shared between counts and lengths".to_string(),
        });
    }
    if pairs.len() < counts.n_features() {
        log::debug!(
            "{} of {} features have no length and were dropped",
            counts.n_features() - pairs.len(),
            counts.n_features()
        );
    }

    let rows: Vec<usize> = pairs.iter().map(|&(i, _)| i).collect();
    let joined = counts.subset_features(&rows)?;
    let feature_ids = joined.feature_ids().to_vec();
    let sample_ids = joined.sample_ids().to_vec();

    // rate = count / length
    let mut tpm = joined.into_values();
    for (mut row, &(_, j)) in tpm.axis_iter_mut(Axis(0)).zip(pairs.iter()) {
        let length = length_col[j];
        row.mapv_inplace(|count| count / length);
    }

    // tpm = rate / sum(rate) * 1e6, per sample
    for mut col in tpm.axis_iter_mut(Axis(1)) {
        let denom: f64 = col.iter().filter(|r| !r.is_nan()).sum();
        col.mapv_inplace(|rate| rate / denom * TPM_SCALE);
    }

    ExpressionMatrix::new(tpm, feature_ids, sample_ids)
}

/// Convert counts to TPM with a separate length column for every sample
///
/// Each sample is normalized on its own against the length column of the
/// same name, then the single-sample results are joined on feature ID.
/// Output columns follow the input column order.
pub fn counts2tpm_many(
    counts: &ExpressionMatrix,
    lengths: &LengthTable,
) -> Result<ExpressionMatrix> {
    let per_sample = counts
        .sample_ids()
        .iter()
        .map(|sample| {
            let sample_lengths = lengths.column(sample)?;
            counts2tpm(&counts.column(sample)?, &sample_lengths)
        })
        .collect::<Result<Vec<ExpressionMatrix>>>()?;

    let mut normalized = per_sample.into_iter();
    let first = normalized.next().ok_or_else(|| ZpcaError::EmptyData {
        reason: "Count matrix has no samples".to_string(),
    })?;

    normalized.try_fold(first, |merged, sample| merged.inner_join(&sample))
}

/// Normalize with whichever variant the length table calls for
///
/// A single length column is shared by every sample; otherwise each sample
/// needs its own column.
pub fn normalize(counts: &ExpressionMatrix, lengths: &LengthTable) -> Result<ExpressionMatrix> {
    if lengths.is_shared() {
        log::info!("Normalizing {} samples with shared feature lengths", counts.n_samples());
        counts2tpm(counts, lengths)
    } else {
        log::info!("Normalizing {} samples with per-sample feature lengths", counts.n_samples());
        counts2tpm_many(counts, lengths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn example_counts() -> ExpressionMatrix {
        ExpressionMatrix::new(
            array![[10.0, 20.0], [5.0, 5.0]],
            ids(&["A", "B"]),
            ids(&["s1", "s2"]),
        )
        .unwrap()
    }

    #[test]
    fn test_counts2tpm_two_by_two() {
        let lengths = LengthTable::shared(ids(&["A", "B"]), vec![1000.0, 500.0]).unwrap();
        let tpm = counts2tpm(&example_counts(), &lengths).unwrap();

        // s1: rates 0.01, 0.01; s2: rates 0.02, 0.01
        assert!((tpm.values()[[0, 0]] - 500_000.0).abs() < 1e-6);
        assert!((tpm.values()[[1, 0]] - 500_000.0).abs() < 1e-6);
        assert!((tpm.values()[[0, 1]] - 2.0e6 / 3.0).abs() < 1e-6);
        assert!((tpm.values()[[1, 1]] - 1.0e6 / 3.0).abs() < 1e-6);

        for sum in tpm.column_sums() {
            assert!((sum - TPM_SCALE).abs() < 1e-6);
        }
    }

    #[test]
    fn test_column_sums_are_one_million() {
        let counts = ExpressionMatrix::new(
            array![
                [120.0, 0.0, 33.0, 4.0],
                [7.0, 950.0, 12.0, 18.0],
                [1500.0, 3.0, 410.0, 250.0],
                [0.0, 42.0, 8.0, 1.0],
                [64.0, 64.0, 64.0, 64.0],
            ],
            ids(&["g1", "g2", "g3", "g4", "g5"]),
            ids(&["s1", "s2", "s3", "s4"]),
        )
        .unwrap();
        let lengths = LengthTable::shared(
            ids(&["g1", "g2", "g3", "g4", "g5"]),
            vec![850.0, 2300.0, 1200.0, 300.0, 5100.0],
        )
        .unwrap();

        let tpm = counts2tpm(&counts, &lengths).unwrap();
        assert_eq!(tpm.sample_ids(), counts.sample_ids());
        for sum in tpm.column_sums() {
            assert!((sum - TPM_SCALE).abs() < 1e-6, "column sum {}", sum);
        }
    }

    #[test]
    fn test_unmatched_features_dropped() {
        let counts = ExpressionMatrix::new(
            array![[10.0], [5.0], [8.0]],
            ids(&["A", "B", "C"]),
            ids(&["s1"]),
        )
        .unwrap();
        let lengths = LengthTable::shared(ids(&["B", "A", "Z"]), vec![500.0, 1000.0, 10.0]).unwrap();

        let tpm = counts2tpm(&counts, &lengths).unwrap();
        assert_eq!(tpm.feature_ids(), &ids(&["A", "B"])[..]);
        assert!((tpm.column_sums()[0] - TPM_SCALE).abs() < 1e-6);
    }

    #[test]
    fn test_no_shared_features() {
        let lengths = LengthTable::shared(ids(&["X"]), vec![100.0]).unwrap();
        assert!(matches!(
            counts2tpm(&example_counts(), &lengths),
            Err(ZpcaError::EmptyData { .. })
        ));
    }

    #[test]
    fn test_multi_column_lengths_rejected() {
        let table = ExpressionMatrix::new(
            array![[1000.0, 1000.0], [500.0, 500.0]],
            ids(&["A", "B"]),
            ids(&["s1", "s2"]),
        )
        .unwrap();
        let lengths = LengthTable::new(table).unwrap();
        assert!(matches!(
            counts2tpm(&example_counts(), &lengths),
            Err(ZpcaError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_zero_length_propagates() {
        let lengths = LengthTable::shared(ids(&["A", "B"]), vec![0.0, 500.0]).unwrap();
        let tpm = counts2tpm(&example_counts(), &lengths).unwrap();
        // Infinite rate for A makes the denominator infinite
        assert!(tpm.values()[[0, 0]].is_nan());
        assert_eq!(tpm.values()[[1, 0]], 0.0);
    }

    #[test]
    fn test_missing_length_propagates() {
        let counts = ExpressionMatrix::new(
            array![[10.0, 20.0], [5.0, 5.0], [3.0, 4.0]],
            ids(&["A", "B", "C"]),
            ids(&["s1", "s2"]),
        )
        .unwrap();
        let lengths =
            LengthTable::shared(ids(&["A", "B", "C"]), vec![1000.0, f64::NAN, 300.0]).unwrap();
        let tpm = counts2tpm(&counts, &lengths).unwrap();
        let v = tpm.values();

        // NaN rate for B stays out of the denominator
        assert!(v[[1, 0]].is_nan() && v[[1, 1]].is_nan());
        assert!((v[[0, 0]] - 500000.0).abs() < 1e-6);
        assert!((v[[0, 1]] - 600000.0).abs() < 1e-6);
        assert!((v[[2, 0]] - 500000.0).abs() < 1e-6);
        assert!((v[[2, 1]] - 400000.0).abs() < 1e-6);
        for j in 0..2 {
            let finite: f64 = v.column(j).iter().filter(|x| !x.is_nan()).sum();
            assert!((finite - TPM_SCALE).abs() < 1e-6);
        }
    }

    #[test]
    fn test_counts2tpm_many_independent_samples() {
        let counts = ExpressionMatrix::new(
            array![[10.0, 20.0, 7.0], [5.0, 5.0, 70.0], [1.0, 40.0, 3.0]],
            ids(&["A", "B", "C"]),
            ids(&["s1", "s2", "s3"]),
        )
        .unwrap();
        let lengths = LengthTable::new(
            ExpressionMatrix::new(
                array![[900.0, 1000.0, 1100.0], [450.0, 500.0, 550.0], [2000.0, 2100.0, 1900.0]],
                ids(&["A", "B", "C"]),
                ids(&["s3", "s1", "s2"]),
            )
            .unwrap(),
        )
        .unwrap();

        let tpm = counts2tpm_many(&counts, &lengths).unwrap();
        assert_eq!(tpm.sample_ids(), counts.sample_ids());
        for sum in tpm.column_sums() {
            assert!((sum - TPM_SCALE).abs() < 1e-6);
        }

        // Normalizing one sample at a time gives the same columns
        for (j, sample) in counts.sample_ids().iter().enumerate() {
            let single = counts2tpm_many(&counts.column(sample).unwrap(), &lengths).unwrap();
            for i in 0..tpm.n_features() {
                assert!((single.values()[[i, 0]] - tpm.values()[[i, j]]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_counts2tpm_many_missing_column() {
        let lengths = LengthTable::new(
            ExpressionMatrix::new(
                array![[1000.0, 1000.0], [500.0, 500.0]],
                ids(&["A", "B"]),
                ids(&["s1", "other"]),
            )
            .unwrap(),
        )
        .unwrap();

        match counts2tpm_many(&example_counts(), &lengths) {
            Err(ZpcaError::MissingColumn { column }) => assert_eq!(column, "s2"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_dispatch() {
        let shared = LengthTable::shared(ids(&["A", "B"]), vec![1000.0, 500.0]).unwrap();
        let per_sample = LengthTable::new(
            ExpressionMatrix::new(
                array![[1000.0, 1000.0], [500.0, 500.0]],
                ids(&["A", "B"]),
                ids(&["s1", "s2"]),
            )
            .unwrap(),
        )
        .unwrap();

        let a = normalize(&example_counts(), &shared).unwrap();
        let b = normalize(&example_counts(), &per_sample).unwrap();
        for (x, y) in a.values().iter().zip(b.values().iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }
}
