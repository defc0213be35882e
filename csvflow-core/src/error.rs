//! Error types for table operations and pipeline execution

use thiserror::Error;

/// Result type for table operations and pipeline execution
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for table operations and pipeline execution
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced column does not exist in the table
    #[error("column '{name}' does not exist in the table")]
    ColumnNotFound {
        /// Name of the missing column
        name: String,
    },

    /// Filter operator is not in the allowed set
    #[error("invalid filter operator '{0}', expected one of: >, <, ==, >=, <=")]
    InvalidOperator(String),

    /// Column kind is neither numeric nor text for the requested operation
    #[error("unsupported column type for column '{column}'")]
    UnsupportedColumnType {
        /// Name of the offending column
        column: String,
    },

    /// Aggregation operation name is unrecognized
    #[error("unsupported aggregation '{0}', expected one of: sum, mean, min, max, count, product, std, var")]
    UnsupportedOperation(String),

    /// Wrong number of argument words for a pipeline operation
    #[error("operation '{op}' expects {expected} argument(s), got {found}")]
    ArgumentCount {
        /// Operation name
        op: String,
        /// Expected argument count
        expected: usize,
        /// Actual argument count
        found: usize,
    },

    /// Sort order token is neither ASC nor DESC
    #[error("invalid sort order '{0}', use 'ASC' or 'DESC'")]
    InvalidSortOrder(String),

    /// Filter value does not parse for a numeric column
    #[error("filter value '{value}' is not numeric but column '{column}' is")]
    InvalidFilterValue {
        /// Name of the filtered column
        column: String,
        /// The offending value token
        value: String,
    },

    /// Table construction with unequal column lengths or duplicate names
    #[error("malformed table: {0}")]
    MalformedTable(String),

    /// Encoding label not recognized by encoding_rs
    #[error("unknown encoding label '{0}'")]
    UnknownEncoding(String),

    /// I/O error during load or save
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV format error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
