//! rust_zpca command-line interface

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::Parser;
use log::{info, LevelFilter};

use rust_zpca::cli::{Cli, Commands};
use rust_zpca::prelude::*;
use rust_zpca::run_pca;

const TPM_FILE: &str = "tpm.tsv";
const SCORES_FILE: &str = "loading_scores.tsv";
const VARIANCE_FILE: &str = "explained_variance.tsv";
const SUMMARY_FILE: &str = "summary.json";
const SCREE_FILE: &str = "scree.svg";

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Tpm {
            counts,
            lengths,
            output,
        } => run_tpm(&counts, &lengths, &output),
        Commands::Pca {
            tpm,
            output,
            no_plots,
        } => run_component_analysis(&tpm, &output, !no_plots),
        Commands::Run {
            counts,
            lengths,
            output,
            no_plots,
        } => run_full(&counts, &lengths, &output, !no_plots),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn load_and_normalize(counts_path: &str, lengths_path: &str) -> Result<(ExpressionMatrix, bool)> {
    info!("Loading count table from: {}", counts_path);
    let counts = read_expression_matrix(counts_path)?;
    info!("  {} features, {} samples", counts.n_features(), counts.n_samples());

    info!("Loading length table from: {}", lengths_path);
    let lengths = read_length_table(lengths_path)?;
    info!("  {} features, {} length column(s)", lengths.feature_ids().len(), lengths.n_columns());

    let tpm = normalize(&counts, &lengths)?;
    if tpm.n_features() < counts.n_features() {
        log::warn!(
            "{} feature(s) without a length were dropped",
            counts.n_features() - tpm.n_features()
        );
    }
    Ok((tpm, !lengths.is_shared()))
}

fn run_tpm(counts_path: &str, lengths_path: &str, output_path: &str) -> Result<()> {
    let (tpm, _) = load_and_normalize(counts_path, lengths_path)?;

    info!("Writing TPM table to: {}", output_path);
    write_expression_matrix(output_path, &tpm)?;

    info!("Done!");
    Ok(())
}

fn run_component_analysis(tpm_path: &str, output_dir: &str, plots: bool) -> Result<()> {
    info!("Loading expression table from: {}", tpm_path);
    let tpm = read_expression_matrix(tpm_path)?;
    info!("  {} features, {} samples", tpm.n_features(), tpm.n_samples());

    fs::create_dir_all(output_dir)?;
    write_pca_outputs(&tpm, Path::new(output_dir), None, plots)?;

    info!("Done!");
    Ok(())
}

fn run_full(counts_path: &str, lengths_path: &str, output_dir: &str, plots: bool) -> Result<()> {
    let (tpm, per_sample) = load_and_normalize(counts_path, lengths_path)?;

    let out = Path::new(output_dir);
    fs::create_dir_all(out)?;

    let tpm_path = out.join(TPM_FILE);
    info!("Writing TPM table to: {}", tpm_path.display());
    write_expression_matrix(&tpm_path, &tpm)?;

    write_pca_outputs(&tpm, out, Some(per_sample), plots)?;

    info!("Done!");
    Ok(())
}

/// Run PCA and write scores, variance, summary and plots into `out`
fn write_pca_outputs(
    tpm: &ExpressionMatrix,
    out: &Path,
    per_sample_lengths: Option<bool>,
    plots: bool,
) -> Result<()> {
    let summary = AnalysisSummary::new(tpm, per_sample_lengths);

    let result = match run_pca(tpm)? {
        Some(result) => result,
        None => {
            write_summary_json(out.join(SUMMARY_FILE), &summary)?;
            return Ok(());
        }
    };

    let scores_path = out.join(SCORES_FILE);
    info!("Writing component scores to: {}", scores_path.display());
    write_scores(&scores_path, &result.scores)?;
    write_variance_summary(out.join(VARIANCE_FILE), &result)?;
    write_summary_json(out.join(SUMMARY_FILE), &summary.with_components(&result))?;

    if plots {
        let options = RenderOptions::default();

        let mut scree = BufWriter::new(File::create(out.join(SCREE_FILE))?);
        render_scree(&result, &mut scree, &options)?;
        scree.flush()?;

        for (x, y) in scatter_pairs(result.n_components()) {
            let name = format!("pca_{}_{}.svg", result.labels[x], result.labels[y]);
            info!("Rendering {}", name);
            let mut file = BufWriter::new(File::create(out.join(name))?);
            render_scatter(&result, x, y, &mut file, &options)?;
            file.flush()?;
        }
    }

    Ok(())
}
