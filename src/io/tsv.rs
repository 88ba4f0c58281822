//! Tab-separated reading and writing of expression and length tables

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::Array2;

use crate::data::{ExpressionMatrix, LengthTable};
use crate::error::{Result, ZpcaError};
use crate::pca::{ComponentResult, ScoreMatrix};

/// Parse one numeric field; empty and NA-style fields are missing values
fn parse_value(field: &str) -> Result<f64> {
    let field = field.trim();
    match field {
        "" | "NA" | "NaN" | "nan" => Ok(f64::NAN),
        _ => field.parse::<f64>().map_err(|_| ZpcaError::InvalidMatrix {
            reason: format!("Invalid numeric value: {}", field),
        }),
    }
}

/// Tab unless the header line has no tab and has a comma
fn detect_delimiter(path: &Path) -> Result<u8> {
    let mut header_line = String::new();
    BufReader::new(File::open(path)?).read_line(&mut header_line)?;
    if header_line.trim().is_empty() {
        return Err(ZpcaError::EmptyData {
            reason: format!("Empty table file: {}", path.display()),
        });
    }
    Ok(if !header_line.contains('\t') && header_line.contains(',') {
        b','
    } else {
        b'\t'
    })
}

/// Read a table whose first column is the feature ID and whose header row names the samples
///
/// The header may omit the name of the ID column.
pub fn read_expression_matrix<P: AsRef<Path>>(path: P) -> Result<ExpressionMatrix> {
    let path = path.as_ref();
    let delimiter = detect_delimiter(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut feature_ids: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut sample_ids: Option<Vec<String>> = None;

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }

        if sample_ids.is_none() {
            sample_ids = Some(if record.len() == header.len() + 1 {
                header.clone()
            } else {
                header.iter().skip(1).cloned().collect()
            });
        }
        let expected = sample_ids.as_ref().map_or(0, Vec::len) + 1;

        if record.len() != expected {
            return Err(ZpcaError::InvalidMatrix {
                reason: format!("Row has {} columns, expected {}", record.len(), expected),
            });
        }

        feature_ids.push(record[0].to_string());
        let row = record
            .iter()
            .skip(1)
            .map(parse_value)
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    let sample_ids = sample_ids.ok_or_else(|| ZpcaError::EmptyData {
        reason: format!("No features found in {}", path.display()),
    })?;

    let n_samples = sample_ids.len();
    let values = Array2::from_shape_vec(
        (rows.len(), n_samples),
        rows.into_iter().flatten().collect(),
    )
    .map_err(|e| ZpcaError::InvalidMatrix {
        reason: e.to_string(),
    })?;

    ExpressionMatrix::new(values, feature_ids, sample_ids)
}

/// Read a length table: one shared length column, or one column per sample
pub fn read_length_table<P: AsRef<Path>>(path: P) -> Result<LengthTable> {
    LengthTable::new(read_expression_matrix(path)?)
}

fn tsv_writer<P: AsRef<Path>>(path: P) -> Result<csv::Writer<File>> {
    Ok(csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?)
}

/// Write an expression matrix, header `feature_id` followed by sample names
pub fn write_expression_matrix<P: AsRef<Path>>(path: P, matrix: &ExpressionMatrix) -> Result<()> {
    let mut writer = tsv_writer(path)?;

    let mut header = vec!["feature_id".to_string()];
    header.extend(matrix.sample_ids().iter().cloned());
    writer.write_record(&header)?;

    for (feature_id, row) in matrix.feature_ids().iter().zip(matrix.values().rows()) {
        let mut record = vec![feature_id.clone()];
        record.extend(row.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write per-sample component scores, header `sample` followed by component labels
pub fn write_scores<P: AsRef<Path>>(path: P, scores: &ScoreMatrix) -> Result<()> {
    let mut writer = tsv_writer(path)?;

    let mut header = vec!["sample".to_string()];
    header.extend(scores.labels.iter().cloned());
    writer.write_record(&header)?;

    for (sample, row) in scores.sample_ids.iter().zip(scores.values.rows()) {
        let mut record = vec![sample.clone()];
        record.extend(row.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write explained variance per component
pub fn write_variance_summary<P: AsRef<Path>>(path: P, result: &ComponentResult) -> Result<()> {
    let mut writer = tsv_writer(path)?;
    writer.write_record(["component", "explained_variance", "eigenvalue"])?;

    for ((label, ratio), eigenvalue) in result
        .labels
        .iter()
        .zip(result.variance_ratio.iter())
        .zip(result.eigenvalues.iter())
    {
        writer.write_record([label.clone(), format!("{:.1}", ratio), eigenvalue.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}
