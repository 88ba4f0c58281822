//! Data structures for expression tables

mod expression_matrix;
mod length_table;

pub use expression_matrix::ExpressionMatrix;
pub use length_table::LengthTable;
