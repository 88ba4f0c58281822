//! Input/Output for expression tables and analysis results

mod summary;
mod tsv;

pub use summary::{write_summary_json, AnalysisSummary};
pub use tsv::{
    read_expression_matrix, read_length_table, write_expression_matrix, write_scores,
    write_variance_summary,
};
