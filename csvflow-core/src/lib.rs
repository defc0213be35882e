//! Table abstraction and transformation pipeline for delimited text data
//!
//! This crate provides an in-memory table of named, typed columns together
//! with the set of operations a pipeline can apply to it: load-time type
//! normalization, missing-value imputation, empty-row removal, filtering,
//! sorting, aggregation, row inspection and saving. The pipeline module turns
//! a delimiter-separated operation string into a typed sequence of operations
//! and runs them against a single owned table.

#![warn(missing_docs)]

pub mod aggregate;
pub mod column;
pub mod csv;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod table;

// Re-export key types for convenience
pub use aggregate::Stat;
pub use column::{Cells, Column, ColumnKind};
pub use error::{Error, Result};
pub use filter::{CmpOp, Condition};
pub use pipeline::{Op, Runner, StepOutput};
pub use table::{Table, TableView};
