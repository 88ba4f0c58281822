//! Command-line interface for rust_zpca

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rust_zpca")]
#[command(version)]
#[command(about = "TPM normalization and principal component analysis of expression tables")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert raw counts to TPM
    #[command(
        long_about = "Convert raw counts to Transcripts Per Million.\n\n\
            A length table with a single column applies the same feature lengths to\n\
            every sample. A length table with one column per sample (named like the\n\
            count columns) normalizes each sample against its own lengths.",
        after_long_help = "\
Examples:
  rust_zpca tpm -c counts.tsv -l lengths.tsv -o tpm.tsv
  rust_zpca tpm -c counts.tsv -l effective_lengths_per_sample.tsv -o tpm.tsv"
    )]
    Tpm {
        /// Path to raw count table
        #[arg(short, long,
            long_help = "Path to raw count table.\n\
                Format: first column = feature IDs, remaining columns = counts per sample.\n\
                Tab-separated; comma-separated is detected from the header.")]
        counts: String,

        /// Path to feature length table
        #[arg(short, long)]
        lengths: String,

        /// Output file path [default: tpm.tsv]
        #[arg(short, long, default_value = "tpm.tsv")]
        output: String,
    },

    /// Run principal component analysis on an expression table
    #[command(
        long_about = "Run principal component analysis on an expression table (e.g. TPM).\n\n\
            Features are mean-centered across samples without variance scaling.\n\
            Two samples yield two components; three or more yield three.\n\
            A single sample is reported and no PCA outputs are written.",
        after_long_help = "\
Examples:
  rust_zpca pca -t tpm.tsv -o pca_out
  rust_zpca pca -t tpm.tsv -o pca_out --no-plots"
    )]
    Pca {
        /// Path to expression table
        #[arg(short, long)]
        tpm: String,

        /// Output directory
        #[arg(short, long, default_value = "zpca_out")]
        output: String,

        /// Skip SVG scree and scatter plots
        #[arg(long)]
        no_plots: bool,
    },

    /// Normalize counts to TPM, then run PCA
    #[command(after_long_help = "\
Examples:
  rust_zpca run -c counts.tsv -l lengths.tsv -o results")]
    Run {
        /// Path to raw count table
        #[arg(short, long)]
        counts: String,

        /// Path to feature length table
        #[arg(short, long)]
        lengths: String,

        /// Output directory
        #[arg(short, long, default_value = "zpca_out")]
        output: String,

        /// Skip SVG scree and scatter plots
        #[arg(long)]
        no_plots: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from([
            "rust_zpca", "run", "-c", "counts.tsv", "-l", "lengths.tsv", "--no-plots", "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                counts,
                lengths,
                output,
                no_plots,
            } => {
                assert_eq!(counts, "counts.tsv");
                assert_eq!(lengths, "lengths.tsv");
                assert_eq!(output, "zpca_out");
                assert!(no_plots);
            }
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn test_tpm_requires_lengths() {
        assert!(Cli::try_parse_from(["rust_zpca", "tpm", "-c", "counts.tsv"]).is_err());
    }
}
