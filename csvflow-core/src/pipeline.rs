//! Pipeline parsing and execution
//!
//! An operation-description string like
//! `update;replace_missing;remove_empty;filter age > 10;aggregate age sum`
//! is parsed up front into a sequence of [`Op`] values with typed payloads;
//! malformed argument counts fail the parse before any table mutation.
//! Unknown operation names are reported and skipped, never fatal. The
//! [`Runner`] then owns the single current table and applies the operations
//! in order, each consuming the state left by the previous one.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::aggregate::Stat;
use crate::csv::{write_table, CsvWriteOptions};
use crate::error::{Error, Result};
use crate::filter::Condition;
use crate::table::Table;

/// A single pipeline operation with its typed argument payload
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Re-run load-time normalization
    Update,

    /// Impute absent cells (mean / most frequent value)
    ReplaceMissing,

    /// Drop rows where every cell is absent
    RemoveEmpty,

    /// View the first rows
    Head,

    /// View the last rows
    Tail,

    /// Stable sort by a column
    Sort {
        /// Column to sort by
        column: String,
        /// Ascending when true
        ascending: bool,
    },

    /// Keep only rows matching a condition
    Filter(Condition),

    /// Reduce a column to a scalar
    Aggregate {
        /// Column to aggregate
        column: String,
        /// Statistic to compute
        stat: Stat,
    },

    /// Save the current state, path resolved against the data directory
    Save(PathBuf),
}

impl Op {
    /// Operation name as written in a pipeline string
    pub fn name(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::ReplaceMissing => "replace_missing",
            Self::RemoveEmpty => "remove_empty",
            Self::Head => "head",
            Self::Tail => "tail",
            Self::Sort { .. } => "sort",
            Self::Filter(_) => "filter",
            Self::Aggregate { .. } => "aggregate",
            Self::Save(_) => "save",
        }
    }
}

/// Parse an operation-description string into typed operations
///
/// Tokens are split on `delimiter` and trimmed; the first whitespace word of
/// a token selects the operation (case-insensitive), the remaining words are
/// its arguments. Exact argument counts are enforced per operation; a
/// mismatch aborts the whole parse. Unknown names are logged and skipped.
pub fn parse_pipeline(spec: &str, delimiter: char) -> Result<Vec<Op>> {
    let mut ops = Vec::new();

    for token in spec.split(delimiter) {
        let words: Vec<&str> = token.split_whitespace().collect();
        let Some((&word, args)) = words.split_first() else {
            continue;
        };
        let name = word.to_lowercase();

        let op = match name.as_str() {
            "update" => {
                expect_args(&name, args, 0)?;
                Op::Update
            }
            "replace_missing" => {
                expect_args(&name, args, 0)?;
                Op::ReplaceMissing
            }
            "remove_empty" => {
                expect_args(&name, args, 0)?;
                Op::RemoveEmpty
            }
            "head" => {
                expect_args(&name, args, 0)?;
                Op::Head
            }
            "tail" => {
                expect_args(&name, args, 0)?;
                Op::Tail
            }
            "sort" => {
                expect_args(&name, args, 2)?;
                Op::Sort {
                    column: args[0].to_string(),
                    ascending: parse_sort_order(args[1])?,
                }
            }
            "filter" => {
                expect_args(&name, args, 3)?;
                Op::Filter(Condition::new(args[0], args[1], args[2])?)
            }
            "aggregate" => {
                expect_args(&name, args, 2)?;
                Op::Aggregate {
                    column: args[0].to_string(),
                    stat: args[1].parse()?,
                }
            }
            "save" => {
                expect_args(&name, args, 1)?;
                Op::Save(PathBuf::from(args[0]))
            }
            _ => {
                warn!(operation = %word, "unknown operation, skipping");
                continue;
            }
        };
        ops.push(op);
    }

    Ok(ops)
}

/// Enforce an exact argument-word count for a known operation
fn expect_args(op: &str, args: &[&str], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::ArgumentCount {
            op: op.to_string(),
            expected,
            found: args.len(),
        })
    }
}

/// Parse an ASC/DESC token (case-insensitive) into an ascending flag
fn parse_sort_order(token: &str) -> Result<bool> {
    match token.to_uppercase().as_str() {
        "ASC" => Ok(true),
        "DESC" => Ok(false),
        _ => Err(Error::InvalidSortOrder(token.to_string())),
    }
}

/// Observable result of one pipeline step
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutput {
    /// A rendered head/tail view
    Rows {
        /// Operation that produced the view
        op: String,
        /// Number of rows in the view
        rows: usize,
        /// The view rendered as text
        rendered: String,
    },

    /// An aggregation result
    Aggregate {
        /// Aggregated column
        column: String,
        /// Statistic that was computed
        stat: Stat,
        /// The scalar value
        value: f64,
    },

    /// A completed save
    Saved(PathBuf),
}

/// Execution options shared by all pipeline steps
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Row count for head/tail views
    pub rows: usize,

    /// Directory that save destinations are resolved against
    pub data_dir: PathBuf,

    /// Delimiter configuration for saved files
    pub write_options: CsvWriteOptions,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            rows: 5,
            data_dir: PathBuf::from("data"),
            write_options: CsvWriteOptions::default(),
        }
    }
}

/// Executes a parsed pipeline against a single owned table
///
/// Operations run strictly in order and to completion; later steps see the
/// state left by earlier ones. Any operation error aborts the remaining
/// pipeline.
pub struct Runner {
    /// The single current table
    table: Table,

    /// Execution options
    options: RunnerOptions,
}

impl Runner {
    /// Create a runner owning `table`
    pub fn new(table: Table, options: RunnerOptions) -> Self {
        Self { table, options }
    }

    /// The current table state
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Consume the runner and return the final table state
    pub fn into_table(self) -> Table {
        self.table
    }

    /// Run every operation in order, collecting per-step outputs
    pub fn run(&mut self, ops: &[Op]) -> Result<Vec<StepOutput>> {
        let mut outputs = Vec::new();
        for op in ops {
            if let Some(output) = self.apply(op)? {
                outputs.push(output);
            }
        }
        Ok(outputs)
    }

    /// Apply one operation to the current table state
    pub fn apply(&mut self, op: &Op) -> Result<Option<StepOutput>> {
        info!(operation = op.name(), "applying operation");

        match op {
            Op::Update => {
                self.table.normalize();
                Ok(None)
            }
            Op::ReplaceMissing => {
                self.table.replace_missing();
                Ok(None)
            }
            Op::RemoveEmpty => {
                self.table.remove_empty_rows();
                Ok(None)
            }
            Op::Head => {
                let view = self.table.head(self.options.rows);
                Ok(Some(StepOutput::Rows {
                    op: "head".to_string(),
                    rows: view.num_rows(),
                    rendered: view.to_string(),
                }))
            }
            Op::Tail => {
                let view = self.table.tail(self.options.rows);
                Ok(Some(StepOutput::Rows {
                    op: "tail".to_string(),
                    rows: view.num_rows(),
                    rendered: view.to_string(),
                }))
            }
            Op::Sort { column, ascending } => {
                let table = std::mem::take(&mut self.table);
                self.table = table.sorted(column, *ascending)?;
                Ok(None)
            }
            Op::Filter(condition) => {
                let table = std::mem::take(&mut self.table);
                self.table = table.filtered(condition)?;
                Ok(None)
            }
            Op::Aggregate { column, stat } => {
                let value = self.table.aggregate(column, *stat)?;
                Ok(Some(StepOutput::Aggregate {
                    column: column.clone(),
                    stat: *stat,
                    value,
                }))
            }
            Op::Save(destination) => {
                let path = self.options.data_dir.join(destination);
                write_table(&self.table, &path, &self.options.write_options)?;
                Ok(Some(StepOutput::Saved(path)))
            }
        }
    }
}
